//! Output formatting for git-evars.
//!
//! Export lines go to stdout either verbatim or as a JSON document.

use anyhow::Result;
use evars_core::{BindingClass, RootTable, VariableBinding};
use serde::Serialize;
use std::io::{self, Write};

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Writer for command output with format abstraction.
pub struct OutputWriter {
    format: OutputFormat,
    stdout: io::Stdout,
}

impl OutputWriter {
    /// Create a new OutputWriter.
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            stdout: io::stdout(),
        }
    }

    /// Write output using the configured format.
    ///
    /// The `text_fn` closure is called only in text mode to generate the
    /// shell-readable output.
    pub fn write<T: Serialize>(&self, data: &T, text_fn: impl FnOnce() -> String) -> Result<()> {
        let mut handle = self.stdout.lock();
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                writeln!(handle, "{}", json)?;
            }
            OutputFormat::Text => {
                let text = text_fn();
                if !text.is_empty() {
                    write!(handle, "{}", text)?;
                }
            }
        }
        handle.flush()?;
        Ok(())
    }

    /// Write an error message to stderr.
    ///
    /// In JSON mode, writes a JSON error object with success=false.
    /// In text mode, writes the error chain directly.
    pub fn write_error(&self, error: &anyhow::Error, result_code: u8) {
        match self.format {
            OutputFormat::Json => {
                let error_output = ErrorOutput {
                    success: false,
                    result_code,
                    error: format!("{:#}", error),
                };
                if let Ok(json) = serde_json::to_string_pretty(&error_output) {
                    let _ = writeln!(io::stderr(), "{}", json);
                }
            }
            OutputFormat::Text => {
                let _ = writeln!(io::stderr(), "Error: {:#}", error);
            }
        }
    }
}

/// Render bindings as a shell script, one `export` per line.
pub fn export_script(bindings: &[VariableBinding]) -> String {
    bindings
        .iter()
        .map(|binding| format!("{}\n", binding.export_line()))
        .collect()
}

// ============================================================================
// Data Transfer Objects (DTOs) for JSON output
// ============================================================================

/// Error output structure.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub result_code: u8,
    pub error: String,
}

/// Result of `--save-config`.
#[derive(Debug, Serialize)]
pub struct ConfigSaved {
    pub path: String,
}

/// One exported variable.
#[derive(Debug, Clone, Serialize)]
pub struct ExportInfo {
    pub name: String,
    pub path: String,
    pub value: String,
    pub class: BindingClass,
    pub line: String,
}

impl From<&VariableBinding> for ExportInfo {
    fn from(binding: &VariableBinding) -> Self {
        Self {
            name: binding.name.clone(),
            path: binding.source_path.clone(),
            value: binding.value.clone(),
            class: binding.class,
            line: binding.export_line(),
        }
    }
}

/// Output for a git-evars run.
#[derive(Debug, Serialize)]
pub struct EvarsOutput<'a> {
    pub success: bool,
    pub result_code: u8,
    pub zowee: bool,
    pub roots: &'a RootTable,
    pub exports: Vec<ExportInfo>,
}
