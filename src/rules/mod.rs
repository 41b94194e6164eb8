//! Session data quality rules
//!
//! Four fixed rules scan the `sessions` table for anomalies:
//! - `missing_data`: null date, type or term_id
//! - `duplicate_dates`: more than one session on a date
//! - `incomplete_attendance`: sessions in populated terms (coarse heuristic)
//! - `auto_imported`: sessions with no resolved review entry
//!
//! # Example
//!
//! ```rust,ignore
//! use session_review::rules::{detect, IssueKind};
//! use session_review::storage::LocalStore;
//!
//! let store = LocalStore::open("dev.sqlite")?;
//! for session in detect(IssueKind::DuplicateDates, &store)? {
//!     println!("{}", IssueKind::DuplicateDates.describe(&session));
//! }
//! ```

pub mod detection;
pub mod types;

pub use detection::{
    detect, detect_auto_imported, detect_duplicate_dates, detect_incomplete_attendance,
    detect_missing_data, SESSION_ITEM_TYPE,
};
pub use types::{IssueKind, ReviewStatus, SessionRecord};
