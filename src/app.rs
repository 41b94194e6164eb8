//! Application context shared by CLI commands.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::{Result, ReviewError};
use crate::storage::{LocalStore, RemoteStore, Store};

/// Resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Project directory the local store and project config are resolved from
    pub root: PathBuf,
    pub config: Config,
    pub output_format: OutputFormat,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = match &cli.root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };
        let config = Config::load(cli.config.as_deref(), &root)?;
        debug!(root = %root.display(), "loaded configuration");

        Ok(Self {
            root,
            config,
            output_format: cli.output_format(),
            verbosity: cli.verbose,
        })
    }

    /// Build a context directly, bypassing argument parsing.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: Config, output_format: OutputFormat) -> Self {
        Self {
            root: root.into(),
            config,
            output_format,
            verbosity: 0,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn is_machine(&self) -> bool {
        self.output_format.is_machine_readable()
    }

    /// Local SQLite store under the project root.
    pub fn local_store(&self) -> Result<LocalStore> {
        LocalStore::locate(&self.root, &self.config.store)
    }

    /// Remote store, run from the project root.
    ///
    /// Fails up front when the configured command cannot be found so a run
    /// never starts against an unreachable store.
    pub fn remote_store(&self) -> Result<RemoteStore> {
        if self.config.remote.database.trim().is_empty() {
            return Err(ReviewError::MissingConfig("remote.database".to_string()));
        }
        let store = RemoteStore::from_config(&self.config.remote).with_work_dir(&self.root);
        if !store.is_available() {
            return Err(ReviewError::RemoteUnavailable(format!(
                "{} not found on PATH",
                self.config.remote.binary
            )));
        }
        Ok(store)
    }

    /// Open the store selected by `remote`.
    pub fn open_store(&self, remote: bool) -> Result<Box<dyn Store>> {
        if remote {
            Ok(Box::new(self.remote_store()?))
        } else {
            Ok(Box::new(self.local_store()?))
        }
    }
}
