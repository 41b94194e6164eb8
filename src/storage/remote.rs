//! RemoteStore - CLI wrapper for `wrangler d1 execute --remote`.
//!
//! Remote D1 has no parameter binding from the command line, so every
//! statement is materialized into literal SQL, written to a temporary file
//! and passed with `--file`. Output is parsed from the command's JSON.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;
use tracing::{debug, error};

use crate::config::RemoteConfig;
use crate::error::{Result, ReviewError};

use super::{materialize, Row, SqlParam, Store};

/// Store backed by an external command that executes SQL remotely.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    /// Program to run (default: "npx")
    binary: PathBuf,

    /// Arguments placed before the `d1 execute` subcommand (default: ["wrangler"])
    args: Vec<String>,

    /// Remote database name
    database: String,

    /// Working directory for the command (uses current dir if None)
    work_dir: Option<PathBuf>,
}

impl RemoteStore {
    /// Create a remote store targeting `database` via `npx wrangler`.
    pub fn new(database: impl Into<String>) -> Self {
        Self::from_config(&RemoteConfig {
            database: database.into(),
            ..RemoteConfig::default()
        })
    }

    #[must_use]
    pub fn from_config(config: &RemoteConfig) -> Self {
        Self {
            binary: PathBuf::from(&config.binary),
            args: config.args.clone(),
            database: config.database.clone(),
            work_dir: None,
        }
    }

    /// Set the working directory for the command.
    #[must_use]
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(work_dir.into());
        self
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Check whether the configured program can be found.
    #[must_use]
    pub fn is_available(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    /// Write `sql` to a temporary file and run it remotely, returning stdout.
    ///
    /// The file is removed when this returns, on success and failure alike.
    fn run_sql(&self, sql: &str) -> Result<String> {
        let mut file = tempfile::Builder::new()
            .prefix(".session-review-")
            .suffix(".sql")
            .tempfile()?;
        file.write_all(sql.as_bytes())?;
        if !sql.trim_end().ends_with(';') {
            file.write_all(b";")?;
        }
        file.write_all(b"\n")?;
        file.flush()?;

        let program = which::which(&self.binary).map_err(|err| {
            let message = format!("{}: {err}", self.binary.display());
            error!(%message, "remote command not found");
            ReviewError::RemoteUnavailable(message)
        })?;

        let mut cmd = Command::new(program);
        cmd.args(&self.args)
            .args(["d1", "execute", &self.database, "--remote", "--json"])
            .arg(format!("--file={}", file.path().display()));
        if let Some(ref dir) = self.work_dir {
            cmd.current_dir(dir);
        }

        debug!(command = %command_string(&cmd), "running remote statement");
        let output = cmd.output().map_err(|err| {
            error!(error = %err, "failed to start remote command");
            ReviewError::RemoteUnavailable(format!("{}: {err}", self.binary.display()))
        })?;

        if !output.status.success() {
            // With --json, wrangler reports the statement error on stdout and
            // may still print warnings on stderr.
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = [stderr.trim(), stdout.trim()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            let exit_code = output.status.code().unwrap_or(-1);
            error!(exit_code, output = %detail, "remote command failed");
            return Err(classify_remote_error(exit_code, &detail));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Store for RemoteStore {
    fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>> {
        let literal = materialize(sql, params)?;
        let stdout = self.run_sql(&literal)?;
        Ok(parse_output(&stdout))
    }

    fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<()> {
        let literal = materialize(sql, params)?;
        self.run_sql(&literal)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("remote database {}", self.database)
    }
}

/// Parse `wrangler d1 execute --json` output into rows.
///
/// Accepts `[{"results": [...]}]`, `{"results": [...]}` or a bare list of
/// rows. Anything else, including empty or malformed output, yields no rows.
pub fn parse_output(output: &str) -> Vec<Row> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let data: Value = match serde_json::from_str(trimmed) {
        Ok(data) => data,
        Err(err) => {
            debug!(error = %err, "remote output is not JSON");
            return Vec::new();
        }
    };

    let rows = match data {
        Value::Array(mut items) => {
            let enveloped = matches!(
                items.first(),
                Some(Value::Object(first)) if first.contains_key("results")
            );
            if enveloped {
                items.swap_remove(0).get_mut("results").map_or(Value::Null, Value::take)
            } else {
                Value::Array(items)
            }
        }
        Value::Object(mut envelope) => envelope.remove("results").unwrap_or(Value::Null),
        _ => Value::Null,
    };

    match rows {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Convert a Command to a string representation.
fn command_string(cmd: &Command) -> String {
    let program = cmd.get_program().to_string_lossy().to_string();
    let args = cmd
        .get_args()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>();
    if args.is_empty() {
        program
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Classify remote command errors into actionable categories.
fn classify_remote_error(exit_code: i32, stderr: &str) -> ReviewError {
    let stderr_lower = stderr.to_lowercase();

    if stderr_lower.contains("unique constraint failed") {
        return ReviewError::UniqueViolation(stderr.to_string());
    }

    if stderr_lower.contains("not logged in")
        || stderr_lower.contains("authentication")
        || stderr_lower.contains("wrangler login")
    {
        return ReviewError::RemoteAuth(stderr.to_string());
    }

    ReviewError::RemoteFailed {
        exit_code,
        stderr: stderr.to_string(),
    }
}
