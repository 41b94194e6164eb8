use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ReviewError};

/// Default Miniflare state directory that holds the local D1 database.
pub const DEFAULT_STATE_DIR: &str = ".wrangler/state/v3/d1/miniflare-D1DatabaseObject";

/// Default remote D1 database name.
pub const DEFAULT_REMOTE_DATABASE: &str = "betterlb_openlgu";

/// Project-level config file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "session-review.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl Config {
    /// Load config layers for the given project root.
    ///
    /// An explicit path (argument or `SESSION_REVIEW_CONFIG`) replaces the
    /// global and project files. Environment overrides are applied last.
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("SESSION_REVIEW_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            match Self::load_patch(&path)? {
                Some(patch) => config.merge_patch(patch),
                None => {
                    return Err(ReviewError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(project_root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("session-review/config.toml"))
    }

    fn load_project(project_root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&project_root.join(PROJECT_CONFIG_FILE))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| ReviewError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| ReviewError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.store {
            self.store.merge(patch);
        }
        if let Some(patch) = patch.remote {
            self.remote.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Some(value) = env_string("SESSION_REVIEW_DB_PATH") {
            self.store.db_path = Some(value);
        }
        if let Some(value) = env_string("SESSION_REVIEW_STATE_DIR") {
            self.store.state_dir = value;
        }
        if let Some(value) = env_string("SESSION_REVIEW_REMOTE_DATABASE") {
            self.remote.database = value;
        }
        if let Some(value) = env_string("SESSION_REVIEW_REMOTE_BINARY") {
            self.remote.binary = value;
        }
        if let Some(values) = env_list("SESSION_REVIEW_REMOTE_ARGS") {
            self.remote.args = values;
        }
    }
}

/// Where the local store lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory (relative to the project root) searched for `*.sqlite` files
    #[serde(default)]
    pub state_dir: String,
    /// Explicit database file; skips the search when set
    #[serde(default)]
    pub db_path: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            state_dir: DEFAULT_STATE_DIR.to_string(),
            db_path: None,
        }
    }
}

impl StoreConfig {
    fn merge(&mut self, patch: StorePatch) {
        if let Some(value) = patch.state_dir {
            self.state_dir = value;
        }
        if let Some(value) = patch.db_path {
            self.db_path = Some(value);
        }
    }
}

/// How remote statements are dispatched.
///
/// The invoked command line is `<binary> <args..> d1 execute <database> --remote --file=<sql>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub binary: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            database: DEFAULT_REMOTE_DATABASE.to_string(),
            binary: "npx".to_string(),
            args: vec!["wrangler".to_string()],
        }
    }
}

impl RemoteConfig {
    fn merge(&mut self, patch: RemotePatch) {
        if let Some(value) = patch.database {
            self.database = value;
        }
        if let Some(value) = patch.binary {
            self.binary = value;
        }
        if let Some(values) = patch.args {
            self.args = values;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    store: Option<StorePatch>,
    remote: Option<RemotePatch>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    state_dir: Option<String>,
    db_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RemotePatch {
    database: Option<String>,
    binary: Option<String>,
    args: Option<Vec<String>>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_list(key: &str) -> Option<Vec<String>> {
    std::env::var(key).ok().map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}
