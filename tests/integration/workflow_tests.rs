use session_review::queue::FlagOutcome;
use session_review::rules::{detect, IssueKind};
use session_review::runner::{parse_criteria, ReviewRunner};

use crate::assert_review_rows;
use crate::fixture::ProjectFixture;

#[test]
fn test_abc_scenario_end_to_end() {
    let project = ProjectFixture::new().with_abc();
    let store = project.context().open_store(false).unwrap();

    let summary = ReviewRunner::new(store.as_ref())
        .run(&parse_criteria("missing_data,duplicate_dates"))
        .unwrap();

    assert_eq!(summary.total_flagged, 3);
    assert_review_rows!(project, "C", "missing_data", 1);
    assert_review_rows!(project, "A", "duplicate_dates", 1);
    assert_review_rows!(project, "B", "duplicate_dates", 1);
    assert_eq!(project.total_reviews(), 3);

    let again = ReviewRunner::new(store.as_ref())
        .run(&parse_criteria("missing_data,duplicate_dates"))
        .unwrap();
    assert_eq!(again.total_flagged, 3);
    assert_eq!(project.total_reviews(), 3);
}

#[test]
fn test_review_rows_are_pending_session_entries() {
    let project = ProjectFixture::new().with_abc();
    let store = project.context().open_store(false).unwrap();
    ReviewRunner::new(store.as_ref()).run(&["missing_data"]).unwrap();

    let (item_type, status, description, id): (String, String, String, String) = project
        .conn()
        .query_row(
            "SELECT item_type, status, description, id FROM review_queue WHERE item_id = 'C'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .unwrap();
    assert_eq!(item_type, "session");
    assert_eq!(status, "pending");
    assert_eq!(description, "Missing required fields: date");
    assert!(id.starts_with("review_"));
}

#[test]
fn test_dry_run_never_touches_queue() {
    let project = ProjectFixture::new().with_abc();
    project.member("1", "p1");
    let store = project.context().open_store(false).unwrap();

    let summary = ReviewRunner::new(store.as_ref())
        .with_preview(true)
        .run(&parse_criteria("all"))
        .unwrap();

    assert!(summary.total_flagged > 0);
    assert!(summary
        .by_criteria
        .iter()
        .flat_map(|c| &c.entries)
        .all(|e| e.outcome == FlagOutcome::Previewed));
    assert_eq!(project.total_reviews(), 0);
}

#[test]
fn test_resolved_sessions_leave_auto_imported() {
    let project = ProjectFixture::new().with_abc();
    let store = project.context().open_store(false).unwrap();

    ReviewRunner::new(store.as_ref()).run(&["auto_imported"]).unwrap();
    assert_eq!(project.total_reviews(), 3);

    project.resolve("A");
    let remaining: Vec<String> = detect(IssueKind::AutoImported, store.as_ref())
        .unwrap()
        .into_iter()
        .filter_map(|s| s.id)
        .collect();
    assert_eq!(remaining.len(), 2);
    assert!(!remaining.contains(&"A".to_string()));
}

#[test]
fn test_resolution_does_not_hide_duplicate_dates() {
    let project = ProjectFixture::new().with_abc();
    let store = project.context().open_store(false).unwrap();

    ReviewRunner::new(store.as_ref()).run(&["duplicate_dates"]).unwrap();
    project.resolve("A");

    let found = detect(IssueKind::DuplicateDates, store.as_ref()).unwrap();
    assert_eq!(found.len(), 2);
}

#[test]
fn test_incomplete_attendance_needs_members() {
    let project = ProjectFixture::new();
    project
        .session("s1", Some("2024-02-01"), Some("regular"), Some("t1"))
        .session("s2", Some("2024-02-02"), Some("regular"), Some("t2"))
        .member("t1", "p1")
        .member("t1", "p2")
        .absence("s1", "p1");
    let store = project.context().open_store(false).unwrap();

    let summary = ReviewRunner::new(store.as_ref())
        .run(&["incomplete_attendance"])
        .unwrap();
    let criterion = summary.criterion(IssueKind::IncompleteAttendance).unwrap();
    assert_eq!(criterion.found, 1);
    assert_eq!(criterion.entries[0].session_id, "s1");
    assert_eq!(
        criterion.entries[0].description,
        "Incomplete attendance: 1 absences recorded for 2 term members"
    );
    assert_review_rows!(project, "s2", "incomplete_attendance", 0);
}

#[test]
fn test_one_session_can_carry_several_issues() {
    let project = ProjectFixture::new().with_abc();
    let store = project.context().open_store(false).unwrap();

    ReviewRunner::new(store.as_ref())
        .run(&parse_criteria("all"))
        .unwrap();

    assert_review_rows!(project, "A", "duplicate_dates", 1);
    assert_review_rows!(project, "A", "auto_imported", 1);
    assert_review_rows!(project, "C", "missing_data", 1);
    assert_review_rows!(project, "C", "auto_imported", 1);
}

#[test]
fn test_unknown_criterion_with_valid_one() {
    let project = ProjectFixture::new().with_abc();
    let store = project.context().open_store(false).unwrap();

    let summary = ReviewRunner::new(store.as_ref())
        .run(&parse_criteria("not_a_rule, missing_data"))
        .unwrap();
    assert_eq!(summary.skipped, vec!["not_a_rule".to_string()]);
    assert_eq!(summary.total_flagged, 1);
}
