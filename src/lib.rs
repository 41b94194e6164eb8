//! session-review
//!
//! Scans council session records in a Cloudflare D1 database for data
//! quality problems and queues the affected sessions for human review.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod queue;
pub mod rules;
pub mod runner;
pub mod storage;
pub mod test_utils;

pub use error::{Result, ReviewError};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
