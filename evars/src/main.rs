use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use evars_core::{
    Config, IGNORE_MARKER, ProcessEnv, RootResolver, RootTable, VariableBinding, ZoweeOptimizer,
    abbreviate, find_git_repos, plain_bindings, tokenize, verbosity,
};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod output;

use output::{ConfigSaved, EvarsOutput, ExportInfo, OutputWriter, export_script};

/// git-evars - Generate bash environment variables for each git repository
#[derive(Parser)]
#[command(name = "git-evars")]
#[command(about = "Generate bash environment variables for each git repository", long_about = None)]
#[command(version)]
#[command(
    after_help = "ROOTS can be directory names or environment variable references (e.g. '$work')."
)]
struct Cli {
    /// Roots to scan (defaults to the configured default roots)
    roots: Vec<String>,

    /// Optimize variable definitions for size
    #[arg(short, long)]
    zowee: bool,

    /// Output a JSON document instead of export lines
    #[arg(long)]
    json: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long, conflicts_with = "save_config")]
    show_config: bool,

    /// Write the effective configuration to ~/.treeconfig.toml and exit
    #[arg(long)]
    save_config: bool,

    /// Suppress normal output, only show errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = OutputWriter::new(cli.json);

    // Logging is not up yet, so a bad config file is reported after init.
    let (config, config_error) = match Config::load(&ProcessEnv) {
        Ok(config) => (config, None),
        Err(err) => {
            let mut config = Config::default();
            config.apply_env(&ProcessEnv);
            (config, Some(err))
        }
    };

    let level = if cli.quiet {
        verbosity::QUIET
    } else {
        config.verbosity.saturating_add(cli.verbose)
    };
    init_logging(level);
    if let Some(err) = config_error {
        warn!(error = %err, "ignoring configuration file");
    }

    match run(&cli, &config, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.write_error(&err, 1);
            ExitCode::from(1)
        }
    }
}

/// Install the stderr subscriber; `RUST_LOG` takes precedence over `level`.
fn init_logging(level: u8) {
    let directive = match level {
        verbosity::QUIET => "error",
        verbosity::NORMAL => "info",
        verbosity::VERBOSE => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: &Cli, config: &Config, output: &OutputWriter) -> Result<()> {
    if cli.show_config {
        let text = config.to_toml().context("Failed to render configuration")?;
        return output.write(config, || text);
    }
    if cli.save_config {
        let path = config.save().context("Failed to save configuration")?;
        let data = ConfigSaved {
            path: path.display().to_string(),
        };
        return output.write(&data, || format!("Saved configuration to {}\n", data.path));
    }

    let args = if cli.roots.is_empty() {
        debug!(roots = ?config.default_roots, "no roots given, using defaults");
        &config.default_roots
    } else {
        &cli.roots
    };
    let tokens = tokenize(args);

    let resolver = RootResolver::with_current_dir(ProcessEnv)
        .context("Failed to determine working directory")?;
    let roots = resolver
        .resolve(&tokens)
        .context("Failed to resolve roots")?;

    let repos = discover(&roots);

    let bindings: Vec<VariableBinding> = if cli.zowee {
        ZoweeOptimizer::with_roots(&roots).optimize_bindings(&repos, &roots.display_keys())
    } else {
        plain_bindings(&repos, &roots)
    };

    let data = EvarsOutput {
        success: true,
        result_code: 0,
        zowee: cli.zowee,
        roots: &roots,
        exports: bindings.iter().map(ExportInfo::from).collect(),
    };
    output.write(&data, || export_script(&bindings))
}

/// Walk every root path, returning repositories sorted and deduplicated.
///
/// A root that cannot be walked is reported and skipped.
fn discover(roots: &RootTable) -> Vec<String> {
    let mut repos = Vec::new();
    for root in roots.all_paths() {
        match find_git_repos(Path::new(root)) {
            Ok(report) => {
                for dir in &report.ignored {
                    info!("Skipping {} due to {} file", abbreviate(dir, roots), IGNORE_MARKER);
                }
                for repo in &report.repos {
                    debug!("Found git repo: {}", abbreviate(repo, roots));
                }
                repos.extend(report.repos);
            }
            Err(err) => {
                warn!(root = %abbreviate(root, roots), error = %err, "could not scan root");
            }
        }
    }

    // Discovery order must not leak into the output.
    repos.sort();
    repos.dedup();
    debug!(count = repos.len(), "repositories found");
    repos
}
