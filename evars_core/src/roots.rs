//! Root argument resolution.
//!
//! A root argument is either an environment variable reference (`$work`,
//! `'$work'`), a bare identifier that may name an environment variable
//! (`work`), or a literal directory path. Resolution turns a list of them
//! into a [`RootTable`] mapping display keys to absolute paths.

use crate::env::Env;
use crate::error::{Error, Result};
use crate::paths;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

static EXPLICIT_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\$([A-Za-z_][A-Za-z0-9_]*)|'\$([A-Za-z_][A-Za-z0-9_]*)')$")
        .expect("explicit reference pattern is valid")
});

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Shell variable named by a display key (`$name` or `'$name'`), if any.
///
/// Literal path keys are not shell variables and yield `None`.
pub(crate) fn variable_name(key: &str) -> Option<&str> {
    let caps = EXPLICIT_REF.captures(key)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// Split every raw argument on whitespace.
///
/// A single quoted CLI argument such as `"$work $sites"` names two roots.
pub fn tokenize<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.as_ref().split_whitespace())
        .map(str::to_string)
        .collect()
}

/// Syntactic classification of one root argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootArg {
    /// `$NAME` or `'$NAME'`: must be defined in the environment.
    Explicit(String),
    /// A bare identifier: an environment variable if defined, else a path.
    Identifier(String),
    /// Anything else, used as a path.
    Literal(String),
}

impl RootArg {
    /// Classify a single (already whitespace-split) argument.
    pub fn parse(arg: &str) -> Self {
        if let Some(caps) = EXPLICIT_REF.captures(arg) {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            return RootArg::Explicit(name.to_string());
        }
        if IDENTIFIER.is_match(arg) {
            return RootArg::Identifier(arg.to_string());
        }
        RootArg::Literal(arg.to_string())
    }
}

/// Display key → absolute paths for every resolved root.
///
/// Keys iterate in lexicographic order. Every stored path is absolute and
/// every entry holds at least one path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RootTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl RootTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `paths` under `key`, replacing any previous entry.
    ///
    /// Returns the replaced paths, if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        paths: Vec<String>,
    ) -> Result<Option<Vec<String>>> {
        let key = key.into();
        if paths.is_empty() {
            return Err(Error::invalid_input(format!("root {} has no paths", key)));
        }
        if let Some(relative) = paths.iter().find(|p| !p.starts_with('/')) {
            return Err(Error::invalid_input(format!(
                "root {} holds relative path: {}",
                key, relative
            )));
        }
        Ok(self.entries.insert(key, paths))
    }

    /// Paths stored under `key`.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Iterate `(display key, paths)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, paths)| (key.as_str(), paths.as_slice()))
    }

    /// All display keys in key order.
    pub fn display_keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Every stored path, in key order.
    pub fn all_paths(&self) -> Vec<&str> {
        self.entries
            .values()
            .flat_map(|paths| paths.iter().map(String::as_str))
            .collect()
    }

    /// Only the roots named by shell variables, keyed `$name`.
    ///
    /// These are the keys that may appear in an `export` value.
    pub fn variable_roots(&self) -> RootTable {
        let entries = self
            .entries
            .iter()
            .filter_map(|(key, paths)| {
                variable_name(key).map(|name| (format!("${}", name), paths.clone()))
            })
            .collect();
        RootTable { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Turns root arguments into a [`RootTable`].
pub struct RootResolver<E> {
    env: E,
    cwd: String,
}

impl<E: Env> RootResolver<E> {
    /// Create a resolver that makes relative paths absolute against `cwd`.
    pub fn new(env: E, cwd: impl Into<String>) -> Self {
        Self {
            env,
            cwd: cwd.into(),
        }
    }

    /// Create a resolver rooted at the process working directory.
    pub fn with_current_dir(env: E) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let cwd = cwd.to_str().ok_or_else(|| {
            Error::invalid_input(format!(
                "working directory is not valid UTF-8: {}",
                cwd.display()
            ))
        })?;
        Ok(Self::new(env, cwd))
    }

    fn lookup(&self, name: &str) -> Option<String> {
        self.env
            .non_empty(name)
            .filter(|value| !value.trim().is_empty())
    }

    /// Display key and unexpanded path value for one argument.
    pub fn expand(&self, arg: &RootArg) -> Result<(String, String)> {
        match arg {
            RootArg::Explicit(name) => {
                let value = self
                    .lookup(name)
                    .ok_or_else(|| Error::undefined_env_var(name.as_str()))?;
                Ok((format!("${}", name), value))
            }
            RootArg::Identifier(name) => match self.lookup(name) {
                Some(value) => Ok((format!("${}", name), value)),
                None => Ok((name.clone(), name.clone())),
            },
            RootArg::Literal(path) => Ok((path.clone(), path.clone())),
        }
    }

    /// Resolve whitespace-split root arguments into a table.
    ///
    /// Two arguments with the same display key leave the later one in place.
    pub fn resolve<S: AsRef<str>>(&self, args: &[S]) -> Result<RootTable> {
        let mut table = RootTable::new();
        for raw in args {
            let arg = RootArg::parse(raw.as_ref());
            let (key, value) = self.expand(&arg)?;
            let absolute: Vec<String> = value
                .split_whitespace()
                .map(|part| paths::absolutize(part, &self.cwd))
                .collect();

            debug!(root = raw.as_ref(), key = %key, paths = ?absolute, "resolved root");
            if table.insert(key.clone(), absolute)?.is_some() {
                debug!(key = %key, "root display key redefined, keeping the later one");
            }
        }
        Ok(table)
    }
}
