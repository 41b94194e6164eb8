use proptest::prelude::*;
use rusqlite::Connection;

use session_review::runner::parse_criteria;
use session_review::storage::{materialize, SqlParam};

proptest! {
    #[test]
    fn test_text_literal_reads_back_unchanged(text in "[^\\x00]{0,64}") {
        let sql = materialize("SELECT ?1", &[SqlParam::from(text.as_str())]).unwrap();
        let conn = Connection::open_in_memory().unwrap();
        let back: String = conn.query_row(&sql, [], |r| r.get(0)).unwrap();
        prop_assert_eq!(back, text);
    }

    #[test]
    fn test_integer_literal_reads_back_unchanged(value in (i64::MIN + 1)..=i64::MAX) {
        let sql = materialize("SELECT ?", &[SqlParam::from(value)]).unwrap();
        let conn = Connection::open_in_memory().unwrap();
        let back: i64 = conn.query_row(&sql, [], |r| r.get(0)).unwrap();
        prop_assert_eq!(back, value);
    }

    #[test]
    fn test_quoted_question_marks_are_left_alone(prefix in "[a-z ]{0,8}", suffix in "[a-z ]{0,8}") {
        let sql = format!("SELECT '{prefix}?{suffix}', ?1");
        let out = materialize(&sql, &[SqlParam::Integer(1)]).unwrap();
        prop_assert_eq!(out, format!("SELECT '{prefix}?{suffix}', 1"));
    }

    #[test]
    fn test_parse_criteria_yields_trimmed_names(names in prop::collection::vec("[a-z_]{1,12}", 0..5)) {
        let raw = names.join(" , ");
        let parsed = parse_criteria(&raw);
        for name in &parsed {
            prop_assert!(!name.is_empty());
            prop_assert_eq!(name.trim(), name.as_str());
        }
        if !names.iter().any(|n| n == "all") || names.len() != 1 {
            prop_assert_eq!(parsed.len(), names.len());
        }
    }
}
