//! Types shared by the detection rules and the review queue.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ReviewError;
use crate::storage::Row;

// =============================================================================
// Issue kinds
// =============================================================================

/// The kind of data quality issue a session is flagged for.
///
/// Stored verbatim in `review_queue.issue_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Null date, type or term_id
    MissingData,
    /// More than one session on the same date
    DuplicateDates,
    /// Session in a populated term, attendance possibly not recorded
    IncompleteAttendance,
    /// No resolved review entry exists for the session
    AutoImported,
}

impl IssueKind {
    /// Every kind, in default run order.
    pub const ALL: [Self; 4] = [
        Self::MissingData,
        Self::DuplicateDates,
        Self::IncompleteAttendance,
        Self::AutoImported,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingData => "missing_data",
            Self::DuplicateDates => "duplicate_dates",
            Self::IncompleteAttendance => "incomplete_attendance",
            Self::AutoImported => "auto_imported",
        }
    }

    /// One-line explanation for listings.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::MissingData => "Sessions with a null date, type or term_id",
            Self::DuplicateDates => "Sessions sharing a date with another session",
            Self::IncompleteAttendance => {
                "Sessions in terms with members, where attendance may be incomplete"
            }
            Self::AutoImported => "Sessions without a resolved review entry",
        }
    }

    /// Human-readable justification recorded with the review entry.
    #[must_use]
    pub fn describe(&self, session: &SessionRecord) -> String {
        match self {
            Self::MissingData => {
                format!("Missing required fields: {}", session.missing_fields().join(", "))
            }
            Self::DuplicateDates => format!(
                "Duplicate session date: {}",
                session.date.as_deref().unwrap_or("unknown")
            ),
            Self::IncompleteAttendance => format!(
                "Incomplete attendance: {} absences recorded for {} term members",
                session.absence_count.unwrap_or(0),
                session.term_member_count.unwrap_or(0)
            ),
            Self::AutoImported => format!("Session flagged for {self}"),
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueKind {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ReviewError::ValidationFailed(format!("unknown criterion '{s}'")))
    }
}

// =============================================================================
// Review status
// =============================================================================

/// Lifecycle state of a review queue entry.
///
/// This crate only ever writes `Pending`; `Resolved` is set by the review
/// workflow and read by the auto_imported rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Resolved,
}

impl ReviewStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
        }
    }
}

// =============================================================================
// Session records
// =============================================================================

/// A session row as returned by a detection query.
///
/// Every column is optional: the rules select different subsets, and a
/// remote store may return numbers where the local one returns text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: Option<String>,
    pub date: Option<String>,
    pub session_type: Option<String>,
    pub term_id: Option<String>,
    pub ordinal_number: Option<i64>,
    pub created_at: Option<String>,
    pub absence_count: Option<i64>,
    pub term_member_count: Option<i64>,
}

impl SessionRecord {
    #[must_use]
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: text(row, "id"),
            date: text(row, "date"),
            session_type: text(row, "type"),
            term_id: text(row, "term_id"),
            ordinal_number: integer(row, "ordinal_number"),
            created_at: text(row, "created_at"),
            absence_count: integer(row, "absence_count"),
            term_member_count: integer(row, "term_member_count"),
        }
    }

    /// Required fields that are null or empty, in schema order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("date", &self.date),
            ("type", &self.session_type),
            ("term_id", &self.term_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
        .map(|(name, _)| name)
        .collect()
    }
}

fn text(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn integer(row: &Row, column: &str) -> Option<i64> {
    match row.get(column)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
