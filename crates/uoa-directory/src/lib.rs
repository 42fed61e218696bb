//! UoA Groups Directory Library
//!
//! This crate provides the directory abstraction used to fetch people records.
//! It includes the Directory trait, an LDAP implementation for the University's
//! Active Directory and an in-memory implementation for tests and offline use.
//!
//! Backends only return attribute maps. Turning a record into a person with
//! roles and affiliations happens in `uoa_core::PersonResolver`; see
//! [`lookup_person`].

pub mod factory;
#[cfg(feature = "directory-ldap")]
pub mod ldap;
pub mod lookup;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use factory::create_directory;
#[cfg(feature = "directory-ldap")]
pub use ldap::LdapDirectory;
pub use lookup::{lookup_person, resolve_all};
pub use memory::InMemoryDirectory;
pub use traits::{Directory, DirectoryError, DirectoryResult};
