use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tempfile::TempDir;

use session_review::app::AppContext;
use session_review::cli::OutputFormat;
use session_review::config::{Config, DEFAULT_STATE_DIR};
use session_review::test_utils::fixtures::SCHEMA_SQL;

// =============================================================================
// Assertion Macros
// =============================================================================

/// Assert how many review rows exist for a session and issue type.
#[macro_export]
macro_rules! assert_review_rows {
    ($fixture:expr, $item:expr, $issue:expr, $count:expr) => {{
        let actual = $fixture.review_rows($item, $issue);
        assert_eq!(
            actual, $count,
            "Expected {} review rows for ({}, {}), found {}",
            $count, $item, $issue, actual
        );
    }};
}

// =============================================================================
// Project Fixture
// =============================================================================

/// A project directory laid out like a wrangler project with local D1 state.
pub struct ProjectFixture {
    pub root: TempDir,
    pub db_path: PathBuf,
}

impl ProjectFixture {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create project dir");
        let state_dir = root.path().join(DEFAULT_STATE_DIR);
        std::fs::create_dir_all(&state_dir).expect("Failed to create state dir");
        let db_path = state_dir.join("e7f3a9.sqlite");

        Connection::open(&db_path)
            .expect("Failed to create database")
            .execute_batch(SCHEMA_SQL)
            .expect("Failed to create schema");

        Self { root, db_path }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn conn(&self) -> Connection {
        Connection::open(&self.db_path).expect("Failed to open database")
    }

    pub fn context(&self) -> AppContext {
        AppContext::new(self.path(), Config::default(), OutputFormat::Json)
    }

    pub fn session(&self, id: &str, date: Option<&str>, kind: Option<&str>, term: Option<&str>) -> &Self {
        self.conn()
            .execute(
                "INSERT INTO sessions (id, date, type, term_id) VALUES (?1, ?2, ?3, ?4)",
                params![id, date, kind, term],
            )
            .expect("Failed to insert session");
        self
    }

    pub fn member(&self, term: &str, person: &str) -> &Self {
        self.conn()
            .execute(
                "INSERT INTO memberships (person_id, term_id) VALUES (?1, ?2)",
                params![person, term],
            )
            .expect("Failed to insert membership");
        self
    }

    pub fn absence(&self, session: &str, person: &str) -> &Self {
        self.conn()
            .execute(
                "INSERT INTO session_absences (session_id, person_id) VALUES (?1, ?2)",
                params![session, person],
            )
            .expect("Failed to insert absence");
        self
    }

    /// Mark every review entry for `item_id` as resolved.
    pub fn resolve(&self, item_id: &str) {
        self.conn()
            .execute(
                "UPDATE review_queue SET status = 'resolved' WHERE item_id = ?1",
                params![item_id],
            )
            .expect("Failed to resolve review entries");
    }

    pub fn review_rows(&self, item_id: &str, issue_type: &str) -> i64 {
        self.conn()
            .query_row(
                "SELECT COUNT(*) FROM review_queue WHERE item_id = ?1 AND issue_type = ?2",
                params![item_id, issue_type],
                |r| r.get(0),
            )
            .expect("Failed to count review rows")
    }

    pub fn total_reviews(&self) -> i64 {
        self.conn()
            .query_row("SELECT COUNT(*) FROM review_queue", [], |r| r.get(0))
            .expect("Failed to count review rows")
    }

    /// Seed the three-session scenario: A and B share a date, C has no date.
    pub fn with_abc(self) -> Self {
        self.session("A", Some("2024-01-01"), Some("X"), Some("1"))
            .session("B", Some("2024-01-01"), Some("Y"), Some("1"))
            .session("C", None, Some("X"), Some("1"));
        self
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Fake remote command
// =============================================================================

/// Write a `sh` script standing in for `wrangler d1 execute`.
///
/// Every SQL file it receives is appended to `statements.log`, one
/// statement per `-- end` block. `body` decides the response; `$sql` holds
/// the statement text.
#[cfg(unix)]
pub fn fake_wrangler(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-wrangler.sh");
    let script = format!(
        "#!/bin/sh\n\
         for arg in \"$@\"; do\n\
         case \"$arg\" in --file=*) f=\"${{arg#--file=}}\";; esac\n\
         done\n\
         sql=$(cat \"$f\")\n\
         printf '%s\\n-- end\\n' \"$sql\" >> \"{dir}/statements.log\"\n\
         {body}\n",
        dir = dir.display(),
    );
    std::fs::write(&path, script).expect("Failed to write fake wrangler");
    path
}

#[cfg(unix)]
pub fn statements(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("statements.log"))
        .unwrap_or_default()
        .split("-- end\n")
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .map(String::from)
        .collect()
}
