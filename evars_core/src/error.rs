//! Error types for evars_core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using evars_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving roots, walking trees or loading config.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred during filesystem operations.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// An explicit `$NAME` root refers to an unset or empty variable.
    #[error("Environment variable ${name} is undefined")]
    UndefinedEnvironmentVariable { name: String },

    /// A path function was called outside its contract.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Configuration file could not be read or parsed.
    #[error("Invalid configuration at {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

impl Error {
    /// Create an UndefinedEnvironmentVariable error.
    pub fn undefined_env_var(name: impl Into<String>) -> Self {
        Error::UndefinedEnvironmentVariable { name: name.into() }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create a Config error.
    pub fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Config {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<ignore::Error> for Error {
    fn from(err: ignore::Error) -> Self {
        // ignore::Error can wrap an io::Error or be a path/loop error
        match err.io_error() {
            Some(io_err) => Error::Io {
                source: std::io::Error::new(io_err.kind(), err.to_string()),
            },
            None => Error::Io {
                source: std::io::Error::other(err.to_string()),
            },
        }
    }
}
