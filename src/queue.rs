//! Review queue writer
//!
//! Inserts one `review_queue` row per (session, issue kind). The table's
//! unique constraint on `(item_type, item_id, issue_type)` makes repeated
//! flagging a no-op, which is reported as success.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::rules::{IssueKind, ReviewStatus, SESSION_ITEM_TYPE};
use crate::storage::{SqlParam, Store};

const INSERT_REVIEW_SQL: &str = "
    INSERT INTO review_queue (id, item_type, item_id, issue_type, description, status, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
";

/// A review queue row about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry {
    pub id: String,
    pub item_type: String,
    pub item_id: String,
    pub issue_type: IssueKind,
    pub description: String,
    pub status: ReviewStatus,
    pub created_at: String,
}

impl ReviewEntry {
    /// Build a pending entry with a fresh id and the current UTC time.
    pub fn new(item_id: impl Into<String>, issue_type: IssueKind, description: impl Into<String>) -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self {
            id: format!("review_{}", &hex[..24]),
            item_type: SESSION_ITEM_TYPE.to_string(),
            item_id: item_id.into(),
            issue_type,
            description: description.into(),
            status: ReviewStatus::Pending,
            created_at: Utc::now().naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        }
    }

    fn params(&self) -> [SqlParam; 7] {
        [
            self.id.as_str().into(),
            self.item_type.as_str().into(),
            self.item_id.as_str().into(),
            self.issue_type.as_str().into(),
            self.description.as_str().into(),
            self.status.as_str().into(),
            self.created_at.as_str().into(),
        ]
    }
}

/// What happened when a session was flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum FlagOutcome {
    /// A new row was written
    Inserted,
    /// The (session, issue kind) pair was already queued
    AlreadyFlagged,
    /// Preview mode: nothing was written
    Previewed,
    /// The write failed for a reason other than a duplicate
    Failed(String),
}

impl FlagOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Queue `item_id` for review under `issue_type`.
///
/// With `preview` set nothing is written and the would-be entry is logged.
/// Failures are logged and returned as [`FlagOutcome::Failed`] so a run can
/// continue with the remaining candidates.
pub fn flag(
    store: &dyn Store,
    item_id: &str,
    issue_type: IssueKind,
    description: &str,
    preview: bool,
) -> FlagOutcome {
    let entry = ReviewEntry::new(item_id, issue_type, description);

    if preview {
        info!(
            session = item_id,
            criterion = %issue_type,
            description,
            "[DRY RUN] would flag session for review"
        );
        return FlagOutcome::Previewed;
    }

    match store.execute(INSERT_REVIEW_SQL, &entry.params()) {
        Ok(()) => {
            info!(session = item_id, criterion = %issue_type, entry = %entry.id, "flagged session");
            FlagOutcome::Inserted
        }
        Err(err) if err.is_unique_violation() => FlagOutcome::AlreadyFlagged,
        Err(err) => {
            warn!(session = item_id, criterion = %issue_type, error = %err, "error flagging session");
            FlagOutcome::Failed(err.to_string())
        }
    }
}
