//! Shared test utilities for session-review.

pub mod fixtures;
