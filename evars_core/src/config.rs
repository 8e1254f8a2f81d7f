//! User configuration.
//!
//! Settings come from, in increasing precedence: built-in defaults, the
//! user file `~/.treeconfig.toml`, and `GIT_TREE_*` environment variables.

use crate::env::Env;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File name of the user configuration, relative to the home directory.
pub const CONFIG_FILE_NAME: &str = ".treeconfig.toml";

pub const ENV_VERBOSITY: &str = "GIT_TREE_VERBOSITY";
pub const ENV_DEFAULT_ROOTS: &str = "GIT_TREE_DEFAULT_ROOTS";

/// Verbosity levels.
pub mod verbosity {
    pub const QUIET: u8 = 0;
    pub const NORMAL: u8 = 1;
    pub const VERBOSE: u8 = 2;
    pub const DEBUG: u8 = 3;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log verbosity, see [`verbosity`].
    pub verbosity: u8,
    /// Root arguments used when none are given on the command line.
    pub default_roots: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbosity: verbosity::NORMAL,
            default_roots: vec!["sites".into(), "sitesUbuntu".into(), "work".into()],
        }
    }
}

/// Location of the user configuration file, if a home directory is known.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}

impl Config {
    /// Load defaults, then the user file, then environment overrides.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(env: &impl Env) -> Result<Self> {
        let mut config = match config_path() {
            Some(path) => Self::load_file(&path)?.unwrap_or_default(),
            None => Self::default(),
        };
        config.apply_env(env);
        Ok(config)
    }

    /// Parse the configuration file at `path`; `Ok(None)` if it does not exist.
    pub fn load_file(path: &Path) -> Result<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(Error::config(path, err.to_string())),
        };
        toml::from_str(&text)
            .map(Some)
            .map_err(|err| Error::config(path, err.to_string()))
    }

    /// Override settings from `GIT_TREE_*` variables. Unparsable values are ignored.
    pub fn apply_env(&mut self, env: &impl Env) {
        if let Some(value) = env.non_empty(ENV_VERBOSITY) {
            match value.trim().parse() {
                Ok(level) => self.verbosity = level,
                Err(_) => warn!(value = %value, "ignoring invalid {}", ENV_VERBOSITY),
            }
        }
        if let Some(value) = env.non_empty(ENV_DEFAULT_ROOTS) {
            self.default_roots = value.split_whitespace().map(str::to_string).collect();
        }
    }

    /// Write to the user configuration file, returning its path.
    pub fn save(&self) -> Result<PathBuf> {
        let path = config_path()
            .ok_or_else(|| Error::config(CONFIG_FILE_NAME, "home directory not found"))?;
        self.save_file(&path)?;
        Ok(path)
    }

    /// Write to `path` in the format read by [`load_file`](Self::load_file).
    pub fn save_file(&self, path: &Path) -> Result<()> {
        let text = self.to_toml()?;
        fs::write(path, text).map_err(|err| Error::config(path, err.to_string()))
    }

    /// Serialize to the file format read by [`load_file`](Self::load_file).
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| Error::config(CONFIG_FILE_NAME, err.to_string()))
    }
}
