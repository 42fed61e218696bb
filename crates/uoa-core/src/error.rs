//! Error types module
//!
//! This module provides the error type used throughout the workspace. Hierarchy
//! construction, person resolution, configuration discovery and directory access
//! all report failures through the `AppError` enum.
//!
//! Absence is not an error: a unit that cannot be found by id, a search without
//! matches or a person without memberships are all represented as empty results.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected outcomes like a person that does not exist
    Debug,
    /// Warning level - for bad input the user can fix
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented on the command line
pub trait ErrorMetadata {
    /// Process exit code to use when the error ends the program
    fn exit_code(&self) -> i32;

    /// Machine-readable error code (e.g., "STRUCTURAL_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether running the same command again may succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The departments table does not describe a single well-formed tree.
    #[error("Structural error: {0}")]
    Structural(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ambiguous result: {0}")]
    Ambiguous(String),

    #[error("Missing attribute '{attribute}' in directory record {record}")]
    MissingAttribute { attribute: String, record: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON serialization error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Config(format!("Invalid membership pattern: {}", err))
    }
}

/// Static metadata for each variant: (exit_code, error_code, recoverable, suggested_action, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (i32, &'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AppError::Structural(_) => (
            65,
            "STRUCTURAL_ERROR",
            false,
            Some("Check the departments workbook for inconsistent rows"),
            LogLevel::Error,
        ),
        AppError::NotFound(_) => (
            1,
            "NOT_FOUND",
            false,
            Some("Verify the identifier exists in the directory"),
            LogLevel::Debug,
        ),
        AppError::Ambiguous(_) => (
            1,
            "AMBIGUOUS",
            false,
            Some("Use a more specific identifier"),
            LogLevel::Warn,
        ),
        AppError::MissingAttribute { .. } => (
            65,
            "MISSING_ATTRIBUTE",
            false,
            None,
            LogLevel::Warn,
        ),
        AppError::Config(_) => (
            78,
            "CONFIG_ERROR",
            false,
            Some("Check ~/.uoa-groups/config or /etc/uoa-groups/config"),
            LogLevel::Error,
        ),
        AppError::Workbook(_) => (
            66,
            "WORKBOOK_ERROR",
            false,
            Some("Check that the departments workbook exists and has a 'Data' sheet"),
            LogLevel::Error,
        ),
        AppError::Directory(_) => (
            69,
            "DIRECTORY_ERROR",
            true,
            Some("Retry after a short delay or check the LDAP credentials"),
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            64,
            "INVALID_INPUT",
            false,
            Some("Check command arguments and try again"),
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            70,
            "INTERNAL_ERROR",
            true,
            None,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Structural(_) => "Structural",
            AppError::NotFound(_) => "NotFound",
            AppError::Ambiguous(_) => "Ambiguous",
            AppError::MissingAttribute { .. } => "MissingAttribute",
            AppError::Config(_) => "Config",
            AppError::Workbook(_) => "Workbook",
            AppError::Directory(_) => "Directory",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn exit_code(&self) -> i32 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }
}
