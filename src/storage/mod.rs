//! Storage layer for session-review
//!
//! Rules and the review queue talk to the store only through [`Store`].
//! Two backends implement it: [`LocalStore`] opens the Miniflare SQLite file
//! directly, [`RemoteStore`] ships literal SQL through `wrangler d1 execute`.

pub mod remote;
pub mod sqlite;

use rusqlite::types::{ToSql, ToSqlOutput};
use serde_json::{Map, Value};

use crate::error::{Result, ReviewError};

pub use remote::RemoteStore;
pub use sqlite::{locate_database, LocalStore};

/// A result row: column name to JSON value.
pub type Row = Map<String, Value>;

/// Read/write access to the session store.
pub trait Store {
    /// Run a read query and return every row.
    fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>>;

    /// Run a write statement.
    fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<()>;

    /// Short human-readable label for logs and reports.
    fn describe(&self) -> String;
}

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Null,
    Integer(i64),
    Text(String),
}

impl SqlParam {
    /// Render as a SQL literal for backends without parameter binding.
    #[must_use]
    pub fn to_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Text(value) => format!("'{}'", value.replace('\'', "''")),
        }
    }
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Self::Integer(value) => ToSqlOutput::from(*value),
            Self::Text(value) => ToSqlOutput::from(value.as_str()),
        })
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlParam {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Substitute `?` / `?N` placeholders with literal values.
///
/// Placeholders inside single-quoted strings, double-quoted identifiers,
/// `--` line comments and `/* */` block comments are left alone. Bare `?`
/// takes the next parameter after the highest one used so far, matching
/// SQLite.
pub fn materialize(sql: &str, params: &[SqlParam]) -> Result<String> {
    let mut out = String::with_capacity(sql.len() + params.len() * 8);
    let mut chars = sql.chars().peekable();
    let mut next_index = 1usize;

    while let Some(ch) = chars.next() {
        match ch {
            '\'' | '"' => {
                // A doubled delimiter closes and reopens, so toggling is enough.
                out.push(ch);
                for inner in chars.by_ref() {
                    out.push(inner);
                    if inner == ch {
                        break;
                    }
                }
                continue;
            }
            '-' if chars.peek() == Some(&'-') => {
                out.push(ch);
                for inner in chars.by_ref() {
                    out.push(inner);
                    if inner == '\n' {
                        break;
                    }
                }
                continue;
            }
            '/' if chars.peek() == Some(&'*') => {
                out.push(ch);
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    out.push(inner);
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
                continue;
            }
            '?' => {}
            _ => {
                out.push(ch);
                continue;
            }
        }

        let mut digits = String::new();
        while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
            digits.push(d);
            chars.next();
        }

        let index = if digits.is_empty() {
            next_index
        } else {
            digits.parse::<usize>().map_err(|err| {
                ReviewError::ValidationFailed(format!("invalid placeholder ?{digits}: {err}"))
            })?
        };
        next_index = next_index.max(index + 1);

        let param = index
            .checked_sub(1)
            .and_then(|i| params.get(i))
            .ok_or_else(|| {
                ReviewError::ValidationFailed(format!(
                    "placeholder ?{index} has no parameter ({} supplied)",
                    params.len()
                ))
            })?;
        out.push_str(&param.to_literal());
    }

    Ok(out)
}
