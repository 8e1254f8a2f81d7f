//! # evars core
//!
//! Names git repositories with shell environment variables.
//!
//! Roots given on the command line (`$work`, `sites`, `../src`) are resolved
//! into absolute directories, the directories are scanned for repositories,
//! and every repository gets an `export NAME=VALUE` line. Values are written
//! relative to variables defined earlier, so the resulting script stays short.
//!
//! ## Features
//!
//! - Root resolution from environment references or literal paths
//! - Abbreviated display of paths under known roots
//! - Compact variable scripts with synthesized shared-ancestor variables
//! - Repository discovery honouring `.ignore` marker files
//!
//! ## Example
//!
//! ```
//! use evars_core::{RootResolver, ZoweeOptimizer, abbreviate};
//! use std::collections::HashMap;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let env: HashMap<String, String> =
//!     [("work".to_string(), "/srv/work".to_string())].into_iter().collect();
//! let roots = RootResolver::new(env, "/home/me").resolve(&["$work"])?;
//!
//! assert_eq!(abbreviate("/srv/work/app", &roots), "$work/app");
//!
//! let lines = ZoweeOptimizer::with_roots(&roots)
//!     .optimize(&["/srv/work/app", "/srv/work/lib"], &roots.display_keys());
//! assert_eq!(lines, ["export app=$work/app", "export lib=$work/lib"]);
//! # Ok(())
//! # }
//! ```

mod abbrev;
mod binding;
mod config;
mod env;
mod error;
mod naming;
pub mod paths;
mod roots;
mod walk;
mod zowee;

pub use abbrev::abbreviate;
pub use binding::{BindingClass, VariableBinding, dedup_lines, plain_bindings};
pub use config::{CONFIG_FILE_NAME, Config, config_path, verbosity};
pub use env::{Env, ProcessEnv};
pub use error::{Error, Result};
pub use naming::env_var_name;
pub use roots::{RootArg, RootResolver, RootTable, tokenize};
pub use walk::{IGNORE_MARKER, WalkReport, find_git_repos};
pub use zowee::ZoweeOptimizer;
