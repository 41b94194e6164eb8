//! Error handling for session-review.
//!
//! This module provides:
//! - [`ReviewError`]: The main error enum for all operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestion and context

mod codes;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;

/// Main error type for session-review operations.
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not find local D1 database file under {searched}")]
    StoreNotFound { searched: String },

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Remote command not available: {0}")]
    RemoteUnavailable(String),

    #[error("Remote command failed (exit {exit_code}): {stderr}")]
    RemoteFailed { exit_code: i32, stderr: String },

    #[error("Remote authentication failed: {0}")]
    RemoteAuth(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl ReviewError {
    /// Get the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::SerializationError,
            Self::StoreNotFound { .. } => ErrorCode::StoreNotFound,
            Self::UniqueViolation(_) => ErrorCode::UniqueViolation,
            Self::RemoteUnavailable(_) => ErrorCode::RemoteUnavailable,
            Self::RemoteFailed { .. } => ErrorCode::RemoteFailed,
            Self::RemoteAuth(_) => ErrorCode::RemoteAuthFailed,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::ValidationFailed(_) => ErrorCode::ValidationFailed,
        }
    }

    /// Whether the store rejected a write because the row already exists.
    ///
    /// Local stores report this as an extended SQLite constraint code; remote
    /// stores are classified from the command's stderr.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::UniqueViolation(_) => true,
            Self::Database(rusqlite::Error::SqliteFailure(err, _)) => {
                err.code == rusqlite::ErrorCode::ConstraintViolation
                    && matches!(
                        err.extended_code,
                        rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                            | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    )
            }
            _ => false,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::StoreNotFound { searched } => Some(serde_json::json!({ "searched": searched })),
            Self::RemoteFailed { exit_code, stderr } => {
                Some(serde_json::json!({ "exit_code": exit_code, "stderr": stderr }))
            }
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_review_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "STORE_NOT_FOUND")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 601)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "storage", "remote")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn from_review_error(err: &ReviewError) -> Self {
        Self {
            context: err.context(),
            ..Self::new(err.code(), err.to_string())
        }
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Result type alias using ReviewError.
pub type Result<T> = std::result::Result<T, ReviewError>;
