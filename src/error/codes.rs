//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 3xx: Config errors
//! - 5xx: Remote command errors
//! - 6xx: Storage errors
//! - 8xx: Validation errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for machine output.
///
/// Each variant maps to a numeric code (e.g., `StoreNotFound` -> E601).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,
    /// E304: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Remote command errors (5xx)
    // ========================================
    /// E501: Remote execution command could not be started
    RemoteUnavailable,
    /// E502: Remote execution command exited with a failure
    RemoteFailed,
    /// E503: Remote execution command rejected our credentials
    RemoteAuthFailed,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E601: Local store file could not be located
    StoreNotFound,
    /// E602: Insert rejected by a uniqueness constraint
    UniqueViolation,
    /// E604: Database operation failed
    DatabaseError,
    /// E605: Serialization/deserialization failed
    SerializationError,

    // ========================================
    // Validation errors (8xx)
    // ========================================
    /// E801: Input validation failed
    ValidationFailed,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E906: File operation failed
    IoError,
}

impl ErrorCode {
    /// Get the numeric code (e.g., 601 for `StoreNotFound`).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::ConfigInvalid => 302,
            Self::ConfigMissingRequired => 304,

            Self::RemoteUnavailable => 501,
            Self::RemoteFailed => 502,
            Self::RemoteAuthFailed => 503,

            Self::StoreNotFound => 601,
            Self::UniqueViolation => 602,
            Self::DatabaseError => 604,
            Self::SerializationError => 605,

            Self::ValidationFailed => 801,

            Self::IoError => 906,
        }
    }

    /// Get the code string (e.g., "E601").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get a default recovery suggestion for this code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::ConfigInvalid => "Check TOML syntax in session-review.toml or the file passed to --config",
            Self::ConfigMissingRequired => "Set the missing value in session-review.toml or via SESSION_REVIEW_* environment variables",

            Self::RemoteUnavailable => "Install wrangler (`npm i -D wrangler`) or set SESSION_REVIEW_REMOTE_BINARY",
            Self::RemoteFailed => "Re-run with -v to see the remote command's stderr",
            Self::RemoteAuthFailed => "Run `npx wrangler login` and retry",

            Self::StoreNotFound => "Run the dev server at least once to create the local database, or use --remote",
            Self::UniqueViolation => "The entry already exists in the review queue",
            Self::DatabaseError => "Check that the store has the sessions and review_queue tables",
            Self::SerializationError => "The remote command returned unexpected output. Re-run with -v for details",

            Self::ValidationFailed => "Review the input and try again",

            Self::IoError => "File operation failed. Check path exists and permissions are correct",
        }
    }

    /// Whether this error is recoverable by user action.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::ConfigInvalid
            | Self::ConfigMissingRequired
            | Self::RemoteUnavailable
            | Self::RemoteFailed
            | Self::RemoteAuthFailed
            | Self::StoreNotFound
            | Self::UniqueViolation
            | Self::ValidationFailed
            | Self::IoError => true,

            Self::DatabaseError | Self::SerializationError => false,
        }
    }

    /// Category name derived from the numeric range.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            3 => "config",
            5 => "remote",
            6 => "storage",
            8 => "validation",
            9 => "internal",
            _ => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
