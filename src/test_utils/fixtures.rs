use std::path::PathBuf;

use rusqlite::{params, Connection};
use tempfile::TempDir;

use crate::storage::LocalStore;

/// Minimal schema the rules and the review queue rely on.
pub const SCHEMA_SQL: &str = "
CREATE TABLE sessions (
    id TEXT PRIMARY KEY,
    date TEXT,
    type TEXT,
    term_id TEXT,
    ordinal_number INTEGER,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE memberships (
    person_id TEXT,
    term_id TEXT
);
CREATE TABLE session_absences (
    session_id TEXT,
    person_id TEXT
);
CREATE TABLE review_queue (
    id TEXT PRIMARY KEY,
    item_type TEXT NOT NULL,
    item_id TEXT NOT NULL,
    issue_type TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL,
    UNIQUE(item_type, item_id, issue_type)
);
";

/// A throwaway SQLite session store in a temp directory.
pub struct SessionStoreFixture {
    pub temp_dir: TempDir,
    pub db_path: PathBuf,
}

impl SessionStoreFixture {
    /// Create a store with the full schema.
    pub fn new() -> Self {
        let fixture = Self::without_schema();
        fixture.conn().execute_batch(SCHEMA_SQL).expect("Failed to create schema");
        fixture
    }

    /// Create an empty database file with no tables.
    pub fn without_schema() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("sessions.sqlite");
        Connection::open(&db_path).expect("Failed to create database");

        println!("[FIXTURE] Created session store: {:?}", db_path);

        Self { temp_dir, db_path }
    }

    pub fn conn(&self) -> Connection {
        Connection::open(&self.db_path).expect("Failed to open database")
    }

    pub fn store(&self) -> LocalStore {
        LocalStore::open(&self.db_path).expect("Fixture database should exist")
    }

    pub fn add_session(
        &self,
        id: &str,
        date: Option<&str>,
        session_type: Option<&str>,
        term_id: Option<&str>,
    ) {
        self.conn()
            .execute(
                "INSERT INTO sessions (id, date, type, term_id) VALUES (?1, ?2, ?3, ?4)",
                params![id, date, session_type, term_id],
            )
            .expect("Failed to insert session");
    }

    pub fn add_session_created(&self, id: &str, date: Option<&str>, created_at: &str) {
        self.conn()
            .execute(
                "INSERT INTO sessions (id, date, type, term_id, created_at) \
                 VALUES (?1, ?2, 'regular', 't1', ?3)",
                params![id, date, created_at],
            )
            .expect("Failed to insert session");
    }

    pub fn add_membership(&self, term_id: &str, person_id: &str) {
        self.conn()
            .execute(
                "INSERT INTO memberships (person_id, term_id) VALUES (?1, ?2)",
                params![person_id, term_id],
            )
            .expect("Failed to insert membership");
    }

    pub fn add_absence(&self, session_id: &str, person_id: &str) {
        self.conn()
            .execute(
                "INSERT INTO session_absences (session_id, person_id) VALUES (?1, ?2)",
                params![session_id, person_id],
            )
            .expect("Failed to insert absence");
    }

    pub fn add_review(&self, id: &str, item_id: &str, issue_type: &str, status: &str) {
        self.conn()
            .execute(
                "INSERT INTO review_queue (id, item_type, item_id, issue_type, description, status, created_at) \
                 VALUES (?1, 'session', ?2, ?3, 'seeded', ?4, '2024-01-01T00:00:00')",
                params![id, item_id, issue_type, status],
            )
            .expect("Failed to insert review entry");
    }

    pub fn review_count(&self) -> i64 {
        self.conn()
            .query_row("SELECT COUNT(*) FROM review_queue", [], |r| r.get(0))
            .unwrap_or(0)
    }

    pub fn review_count_for(&self, item_id: &str, issue_type: &str) -> i64 {
        self.conn()
            .query_row(
                "SELECT COUNT(*) FROM review_queue WHERE item_id = ?1 AND issue_type = ?2",
                params![item_id, issue_type],
                |r| r.get(0),
            )
            .unwrap_or(0)
    }
}

impl Default for SessionStoreFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionStoreFixture {
    fn drop(&mut self) {
        println!("[FIXTURE] Cleaning up session store: {:?}", self.db_path);
    }
}
