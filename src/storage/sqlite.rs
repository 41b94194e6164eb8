//! SQLite database layer

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::StoreConfig;
use crate::error::{Result, ReviewError};

use super::{Row, SqlParam, Store};

/// Direct access to the local Miniflare D1 SQLite file.
///
/// A connection is opened for every call and dropped before returning, so no
/// handle outlives a single statement.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Use the database file at `path`. The file must already exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(ReviewError::StoreNotFound {
                searched: path.display().to_string(),
            });
        }
        Ok(Self { path })
    }

    /// Find the local database under `root` using the store config.
    pub fn locate(root: &Path, config: &StoreConfig) -> Result<Self> {
        Self::open(locate_database(root, config)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }
}

impl Store for LocalStore {
    fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>> {
        debug!(path = %self.path.display(), sql = sql.trim(), "local query");
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            for (idx, name) in columns.iter().enumerate() {
                record.insert(name.clone(), value_to_json(row.get_ref(idx)?));
            }
            results.push(record);
        }
        Ok(results)
    }

    fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<()> {
        debug!(path = %self.path.display(), sql = sql.trim(), "local execute");
        let conn = self.connect()?;
        conn.execute(sql, params_from_iter(params.iter()))?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("local database {}", self.path.display())
    }
}

fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Find the Miniflare D1 SQLite file for a project.
///
/// Lookup order: the configured `db_path`, then the first `*.sqlite` file
/// directly in the state directory, then a recursive walk of the state
/// directory's parent (`.wrangler/state/v3/d1`).
pub fn locate_database(root: &Path, config: &StoreConfig) -> Result<PathBuf> {
    if let Some(explicit) = config.db_path.as_deref() {
        let path = root.join(explicit);
        if path.is_file() {
            return Ok(path);
        }
        return Err(ReviewError::StoreNotFound {
            searched: path.display().to_string(),
        });
    }

    let state_dir = root.join(&config.state_dir);
    if state_dir.is_file() {
        return Ok(state_dir);
    }

    if state_dir.is_dir() {
        let mut direct: Vec<PathBuf> = std::fs::read_dir(&state_dir)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_sqlite_file(path))
            .collect();
        direct.sort();
        if let Some(path) = direct.into_iter().next() {
            return Ok(path);
        }
    }

    // Miniflare nests object stores one level below the d1 directory.
    let walk_root = Path::new(&config.state_dir)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| state_dir.clone(), |parent| root.join(parent));
    if walk_root.is_dir() {
        let nested = WalkDir::new(&walk_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .find(|entry| entry.file_type().is_file() && is_sqlite_file(entry.path()));
        if let Some(entry) = nested {
            return Ok(entry.into_path());
        }
    }

    Err(ReviewError::StoreNotFound {
        searched: state_dir.display().to_string(),
    })
}

fn is_sqlite_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "sqlite")
}
