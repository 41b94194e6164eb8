#![cfg(unix)]

use session_review::app::AppContext;
use session_review::cli::OutputFormat;
use session_review::config::Config;
use session_review::queue::FlagOutcome;
use session_review::rules::IssueKind;
use session_review::runner::ReviewRunner;
use session_review::ReviewError;
use tempfile::TempDir;

use crate::fixture::{fake_wrangler, statements};

/// Responds to the duplicate-dates query with two sessions, accepts the
/// insert for A and rejects B as already queued.
const DUPLICATES_BODY: &str = r#"
case "$sql" in
  *"GROUP BY date"*)
    echo '[{"results":[{"id":"A","date":"2024-01-01","type":"X","term_id":"1","ordinal_number":null},{"id":"B","date":"2024-01-01","type":"Y","term_id":"1","ordinal_number":null}],"success":true}]'
    ;;
  *"'B', 'duplicate_dates'"*)
    echo 'UNIQUE constraint failed: review_queue.item_type, review_queue.item_id, review_queue.issue_type' >&2
    exit 1
    ;;
  *)
    echo '[{"results":[],"success":true}]'
    ;;
esac
"#;

fn remote_context(dir: &TempDir, body: &str) -> AppContext {
    let script = fake_wrangler(dir.path(), body);
    let mut config = Config::default();
    config.remote.binary = "sh".to_string();
    config.remote.args = vec![script.display().to_string()];
    config.remote.database = "council_db".to_string();
    AppContext::new(dir.path(), config, OutputFormat::Json)
}

#[test]
fn test_remote_run_flags_and_tolerates_duplicates() {
    let dir = TempDir::new().unwrap();
    let ctx = remote_context(&dir, DUPLICATES_BODY);
    let store = ctx.open_store(true).unwrap();
    assert_eq!(store.describe(), "remote database council_db");

    let summary = ReviewRunner::new(store.as_ref())
        .run(&["duplicate_dates"])
        .unwrap();
    let dupes = summary.criterion(IssueKind::DuplicateDates).unwrap();
    assert_eq!(dupes.found, 2);
    assert_eq!(dupes.flagged, 2);
    assert_eq!(dupes.entries[0].outcome, FlagOutcome::Inserted);
    assert_eq!(dupes.entries[1].outcome, FlagOutcome::AlreadyFlagged);

    let log = statements(dir.path());
    let inserts: Vec<&String> = log.iter().filter(|s| s.contains("INSERT INTO review_queue")).collect();
    assert_eq!(inserts.len(), 2);
    assert!(inserts[0].contains("'session', 'A', 'duplicate_dates', 'Duplicate session date: 2024-01-01', 'pending'"));
    assert!(!log.iter().any(|s| s.contains('?')));
}

#[test]
fn test_remote_preview_sends_only_reads() {
    let dir = TempDir::new().unwrap();
    let ctx = remote_context(&dir, DUPLICATES_BODY);
    let store = ctx.open_store(true).unwrap();

    let summary = ReviewRunner::new(store.as_ref())
        .with_preview(true)
        .run(&["duplicate_dates", "missing_data"])
        .unwrap();
    assert_eq!(summary.total_flagged, 2);
    assert!(!statements(dir.path()).iter().any(|s| s.contains("INSERT")));
}

#[test]
fn test_auto_imported_query_is_materialized() {
    let dir = TempDir::new().unwrap();
    let ctx = remote_context(&dir, "echo '[]'");
    let store = ctx.open_store(true).unwrap();

    ReviewRunner::new(store.as_ref()).run(&["auto_imported"]).unwrap();
    let log = statements(dir.path()).join("\n");
    assert!(log.contains("item_type = 'session' AND status = 'resolved'"));
}

#[test]
fn test_remote_rule_failure_aborts() {
    let dir = TempDir::new().unwrap();
    let ctx = remote_context(&dir, "echo 'Authentication error: please run wrangler login' >&2; exit 1");
    let store = ctx.open_store(true).unwrap();

    let err = ReviewRunner::new(store.as_ref())
        .run(&["missing_data", "duplicate_dates"])
        .unwrap_err();
    assert!(matches!(err, ReviewError::RemoteAuth(_)));
    assert_eq!(statements(dir.path()).len(), 1);
}

#[test]
fn test_malformed_remote_output_means_no_findings() {
    let dir = TempDir::new().unwrap();
    let ctx = remote_context(&dir, "echo 'Proxy environment variables detected'");
    let store = ctx.open_store(true).unwrap();

    let summary = ReviewRunner::new(store.as_ref())
        .run(&["missing_data"])
        .unwrap();
    assert_eq!(summary.criterion(IssueKind::MissingData).unwrap().found, 0);
}

#[test]
fn test_duplicate_reported_on_stdout_with_stderr_warning() {
    let dir = TempDir::new().unwrap();
    let body = r#"
case "$sql" in
  *"GROUP BY date"*)
    echo '[{"results":[{"id":"A","date":"2024-01-01"},{"id":"B","date":"2024-01-01"}],"success":true}]'
    ;;
  *INSERT*)
    echo '▲ [WARNING] Processing wrangler.toml configuration' >&2
    echo '{"error":{"text":"D1_ERROR","notes":[{"text":"UNIQUE constraint failed: review_queue.item_type, review_queue.item_id, review_queue.issue_type"}]}}'
    exit 1
    ;;
esac
"#;
    let ctx = remote_context(&dir, body);
    let store = ctx.open_store(true).unwrap();

    let summary = ReviewRunner::new(store.as_ref())
        .run(&["duplicate_dates"])
        .unwrap();
    let dupes = summary.criterion(IssueKind::DuplicateDates).unwrap();
    assert_eq!(dupes.flagged, 2);
    assert!(dupes
        .entries
        .iter()
        .all(|e| e.outcome == FlagOutcome::AlreadyFlagged));
    assert_eq!(summary.failed(), 0);
}
