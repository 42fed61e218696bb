//! UoA Groups Core Library
//!
//! This crate provides the organisational hierarchy, person resolution, error types
//! and configuration shared by the directory client and the command-line tool.

pub mod config;
pub mod constants;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod resolver;
#[cfg(feature = "xlsx")]
pub mod workbook;

// Re-export commonly used types
pub use config::{Config, ConfigPaths, LdapConfig};
pub use error::{AppError, AppResult, ErrorMetadata, LogLevel};
pub use hierarchy::{same_unit, HierarchyRow, NodeId, OrgHierarchy, OrgUnit};
pub use models::{AttributeMap, Person, PersonSummary, RoleFlags};
pub use resolver::{MembershipPattern, PersonResolver, RoleGroups};
#[cfg(feature = "xlsx")]
pub use workbook::load_hierarchy;
