//! # reqlint-cli
//!
//! Requirements-manifest parser and linter CLI.
//!
//! This is the main entry point for the reqlint tool. It handles command
//! parsing, sets up logging and error handling, and dispatches to the
//! appropriate command handlers.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use reqlint_core::error::ReqlintResult;
use tracing::{error, info};

mod commands;
mod output;

use commands::CommandContext;

/// Parse and lint requirements manifests
#[derive(Parser)]
#[command(name = "reqlint", version, about = "Requirements-manifest linter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse and lint a manifest
    Check {
        file: Utf8PathBuf,
        /// Report format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
        /// Also report declarations without an exact pin
        #[arg(long)]
        strict: bool,
    },
    /// Print the parsed declarations
    List {
        file: Utf8PathBuf,
        /// Only declarations whose marker holds in the current environment
        #[arg(long)]
        applicable: bool,
        /// Python version used for marker evaluation
        #[arg(long, default_value = "3.12")]
        python_version: String,
    },
    /// Print every declaration of one package
    Show {
        file: Utf8PathBuf,
        package: String,
    },
    /// Show version information
    Version,
}

/// Report format for `check`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> ReqlintResult<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    info!("Starting reqlint v{}", env!("CARGO_PKG_VERSION"));

    run_cli(cli)
}

fn run_cli(cli: Cli) -> ReqlintResult<()> {
    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new().map_err(|e| reqlint_core::error::ReqlintError::Io {
        message: "Failed to create async runtime".to_string(),
        source: e,
    })?;

    rt.block_on(async {
        let ctx = CommandContext::new()?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "reqlint_cli={},reqlint_core={},reqlint_manifest={}",
            level, level, level
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("reqlint encountered an unexpected error: {}", panic_info);
        eprintln!("reqlint crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/reqlint/reqlint/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
