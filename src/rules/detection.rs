//! Session anomaly detection
//!
//! Each rule is a read-only query against the [`Store`] plus an optional
//! in-memory filter. Rules never write; flagging is done by the caller.

use tracing::debug;

use crate::error::Result;
use crate::storage::{SqlParam, Store};

use super::types::{IssueKind, ReviewStatus, SessionRecord};

const MISSING_DATA_SQL: &str = "
    SELECT id, date, type, term_id, ordinal_number
    FROM sessions
    WHERE date IS NULL
       OR type IS NULL
       OR term_id IS NULL
";

const DUPLICATE_DATES_SQL: &str = "
    SELECT id, date, type, term_id, ordinal_number
    FROM sessions
    WHERE date IN (
        SELECT date
        FROM sessions
        WHERE date IS NOT NULL
        GROUP BY date
        HAVING COUNT(*) > 1
    )
    ORDER BY date
";

const INCOMPLETE_ATTENDANCE_SQL: &str = "
    SELECT s.id, s.date, s.type, s.term_id, s.ordinal_number,
           COUNT(sa.person_id) AS absence_count,
           (SELECT COUNT(*) FROM memberships WHERE term_id = s.term_id) AS term_member_count
    FROM sessions s
    LEFT JOIN session_absences sa ON s.id = sa.session_id
    WHERE s.term_id IS NOT NULL
    GROUP BY s.id
    HAVING term_member_count > 0
    ORDER BY s.date DESC
";

const AUTO_IMPORTED_SQL: &str = "
    SELECT id, date, type, term_id, ordinal_number, created_at
    FROM sessions
    WHERE id NOT IN (
        SELECT item_id FROM review_queue WHERE item_type = ?1 AND status = ?2
    )
    ORDER BY created_at DESC
";

/// Item type written to and matched in `review_queue.item_type`.
pub const SESSION_ITEM_TYPE: &str = "session";

/// Run the rule for `kind` and return the candidate sessions.
pub fn detect(kind: IssueKind, store: &dyn Store) -> Result<Vec<SessionRecord>> {
    let sessions = match kind {
        IssueKind::MissingData => detect_missing_data(store)?,
        IssueKind::DuplicateDates => detect_duplicate_dates(store)?,
        IssueKind::IncompleteAttendance => detect_incomplete_attendance(store)?,
        IssueKind::AutoImported => detect_auto_imported(store)?,
    };
    debug!(criterion = %kind, candidates = sessions.len(), "rule finished");
    Ok(sessions)
}

/// Sessions with a null date, type or term_id.
pub fn detect_missing_data(store: &dyn Store) -> Result<Vec<SessionRecord>> {
    fetch(store, MISSING_DATA_SQL, &[])
}

/// Sessions whose non-null date is shared with at least one other session,
/// ordered by date.
pub fn detect_duplicate_dates(store: &dyn Store) -> Result<Vec<SessionRecord>> {
    fetch(store, DUPLICATE_DATES_SQL, &[])
}

/// Sessions in a term that has members.
///
/// Every such session is a candidate regardless of how many absences it has:
/// the store cannot tell "everyone attended" from "attendance never taken".
pub fn detect_incomplete_attendance(store: &dyn Store) -> Result<Vec<SessionRecord>> {
    let sessions = fetch(store, INCOMPLETE_ATTENDANCE_SQL, &[])?;
    Ok(sessions
        .into_iter()
        .filter(|session| session.term_member_count.unwrap_or(0) != 0)
        .collect())
}

/// Sessions with no resolved review entry, newest first.
///
/// A session that only has pending entries, of any issue kind, still counts.
pub fn detect_auto_imported(store: &dyn Store) -> Result<Vec<SessionRecord>> {
    fetch(
        store,
        AUTO_IMPORTED_SQL,
        &[
            SESSION_ITEM_TYPE.into(),
            ReviewStatus::Resolved.as_str().into(),
        ],
    )
}

fn fetch(store: &dyn Store, sql: &str, params: &[SqlParam]) -> Result<Vec<SessionRecord>> {
    Ok(store
        .query(sql, params)?
        .iter()
        .map(SessionRecord::from_row)
        .collect())
}
