//! Variable bindings and their `export` lines.

use crate::abbrev::abbreviate;
use crate::naming::env_var_name;
use crate::roots::RootTable;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Whether a binding names a requested path or a synthesized shared ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingClass {
    Intermediate,
    Terminal,
}

/// One `export NAME=VALUE` definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableBinding {
    pub name: String,
    /// Absolute directory the variable expands to.
    pub source_path: String,
    /// Rendered value: an absolute path or `$OTHER/suffix`.
    pub value: String,
    pub class: BindingClass,
}

impl VariableBinding {
    pub fn new(
        name: impl Into<String>,
        source_path: impl Into<String>,
        value: impl Into<String>,
        class: BindingClass,
    ) -> Self {
        Self {
            name: name.into(),
            source_path: source_path.into(),
            value: value.into(),
            class,
        }
    }

    /// The shell line defining this binding.
    pub fn export_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VariableBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "export {}={}", self.name, self.value)
    }
}

/// Drop bindings whose export line already appeared, keeping the first.
pub fn dedup_lines(bindings: Vec<VariableBinding>) -> Vec<VariableBinding> {
    let mut seen = HashSet::new();
    bindings
        .into_iter()
        .filter(|binding| seen.insert(binding.export_line()))
        .collect()
}

/// One binding per repository, valued by its abbreviation under the
/// variable roots of `table`.
///
/// Literal path roots are never substituted, so every value is either an
/// absolute path or `$NAME/suffix`. Repositories whose directory name yields
/// no variable name are skipped.
pub fn plain_bindings<S: AsRef<str>>(repos: &[S], table: &RootTable) -> Vec<VariableBinding> {
    let variables = table.variable_roots();
    let bindings = repos
        .iter()
        .map(|repo| repo.as_ref())
        .filter_map(|repo| {
            let name = env_var_name(repo)?;
            Some(VariableBinding::new(
                name,
                repo,
                abbreviate(repo, &variables),
                BindingClass::Terminal,
            ))
        })
        .collect();
    dedup_lines(bindings)
}
