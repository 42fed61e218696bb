//! Directory abstraction trait
//!
//! This module defines the Directory trait that all directory backends must implement.

use async_trait::async_trait;
use thiserror::Error;
use uoa_core::{AppError, AttributeMap};

/// Directory operation errors
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Bind failed: {0}")]
    BindFailed(String),

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Identifier '{identifier}' matches {count} directory entries")]
    Ambiguous { identifier: String, count: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for directory operations
pub type DirectoryResult<T> = Result<T, DirectoryError>;

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Ambiguous { .. } => AppError::Ambiguous(err.to_string()),
            DirectoryError::ConfigError(msg) => AppError::Config(msg),
            other => AppError::Directory(other.to_string()),
        }
    }
}

/// Directory abstraction trait
///
/// Backends return raw attribute maps; turning them into people is the job of
/// [`uoa_core::PersonResolver`]. An empty result is never an error.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Look up the single person whose `cn` equals `identifier`.
    ///
    /// Returns `Ok(None)` when nobody matches and `Ambiguous` when more than one
    /// entry does.
    async fn find_by_identifier(&self, identifier: &str) -> DirectoryResult<Option<AttributeMap>>;

    /// People whose display name contains `term`.
    async fn search_by_name(&self, term: &str) -> DirectoryResult<Vec<AttributeMap>>;

    /// People that are direct members of the group `group_dn`.
    async fn members_of_group(&self, group_dn: &str) -> DirectoryResult<Vec<AttributeMap>>;

    /// Release the connection. Further calls may fail.
    async fn close(&self) -> DirectoryResult<()> {
        Ok(())
    }

    /// Short backend name used in logs
    fn backend_name(&self) -> &'static str;
}
