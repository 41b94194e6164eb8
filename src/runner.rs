//! Review run orchestration
//!
//! Runs the requested rules in order and flags every candidate. Each flag is
//! its own statement: nothing is rolled back if a later rule fails.

use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::queue::{self, FlagOutcome};
use crate::rules::{self, IssueKind};
use crate::storage::Store;

/// Expand a `--criteria` value into criterion names.
///
/// `all` (any case) selects every rule in default order; otherwise the value
/// is split on commas. Names are not validated here.
#[must_use]
pub fn parse_criteria(raw: &str) -> Vec<String> {
    if raw.trim().eq_ignore_ascii_case("all") {
        return IssueKind::ALL.iter().map(ToString::to_string).collect();
    }
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// One flag attempt, as reported back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct FlagRecord {
    pub session_id: String,
    pub description: String,
    pub outcome: FlagOutcome,
}

/// Per-criterion counts.
#[derive(Debug, Clone, Serialize)]
pub struct CriterionSummary {
    pub criterion: IssueKind,
    pub found: usize,
    pub flagged: usize,
    pub entries: Vec<FlagRecord>,
}

/// Result of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub preview: bool,
    pub total_flagged: usize,
    pub by_criteria: Vec<CriterionSummary>,
    /// Requested names that did not match a rule
    pub skipped: Vec<String>,
}

impl RunSummary {
    #[must_use]
    pub fn criterion(&self, kind: IssueKind) -> Option<&CriterionSummary> {
        self.by_criteria.iter().find(|c| c.criterion == kind)
    }

    /// Number of flag attempts that failed across all criteria.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.by_criteria
            .iter()
            .flat_map(|c| &c.entries)
            .filter(|e| !e.outcome.is_success())
            .count()
    }
}

/// Drives rules and the review queue against one store.
pub struct ReviewRunner<'a> {
    store: &'a dyn Store,
    preview: bool,
}

impl<'a> ReviewRunner<'a> {
    /// The store already carries the resolved configuration (database path or
    /// remote command), so the runner needs nothing else from `Config`.
    pub fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            preview: false,
        }
    }

    /// Compute findings without writing to the review queue.
    #[must_use]
    pub const fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    /// Run the named criteria in order.
    ///
    /// Unknown names are skipped with a warning. A rule whose query fails
    /// aborts the run; a failed flag only lowers that rule's `flagged` count.
    pub fn run<S: AsRef<str>>(&self, criteria: &[S]) -> Result<RunSummary> {
        let mut summary = RunSummary {
            preview: self.preview,
            ..RunSummary::default()
        };

        info!(store = %self.store.describe(), preview = self.preview, "starting review run");

        for name in criteria {
            let name = name.as_ref();
            let Ok(kind) = IssueKind::from_str(name) else {
                warn!(criterion = name, "unknown criterion, skipping");
                summary.skipped.push(name.to_string());
                continue;
            };

            let result = self.run_criterion(kind)?;
            summary.total_flagged += result.flagged;
            summary.by_criteria.push(result);
        }

        info!(total_flagged = summary.total_flagged, "review run complete");
        Ok(summary)
    }

    fn run_criterion(&self, kind: IssueKind) -> Result<CriterionSummary> {
        info!(criterion = %kind, "running check");
        let sessions = rules::detect(kind, self.store)?;

        let mut entries = Vec::with_capacity(sessions.len());
        for session in &sessions {
            let Some(session_id) = session.id.as_deref().filter(|id| !id.is_empty()) else {
                debug!(criterion = %kind, "candidate without id, skipping");
                continue;
            };

            let description = kind.describe(session);
            let outcome = queue::flag(self.store, session_id, kind, &description, self.preview);
            entries.push(FlagRecord {
                session_id: session_id.to_string(),
                description,
                outcome,
            });
        }

        let flagged = entries.iter().filter(|e| e.outcome.is_success()).count();
        info!(criterion = %kind, found = sessions.len(), flagged, "check finished");

        Ok(CriterionSummary {
            criterion: kind,
            found: sessions.len(),
            flagged,
            entries,
        })
    }
}
