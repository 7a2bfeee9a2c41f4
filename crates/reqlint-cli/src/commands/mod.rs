//! Command implementations and dispatch logic.
//!
//! This module contains all command handlers and the central dispatch system.
//! Each command is implemented as an async function that takes a
//! CommandContext.

use camino::{Utf8Path, Utf8PathBuf};
use reqlint_core::error::{ReqlintError, ReqlintResult};
use tracing::info;

pub mod check;
pub mod list;
pub mod show;

#[cfg(test)]
mod tests;

use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Create a new command context
    pub fn new() -> ReqlintResult<Self> {
        let cwd = std::env::current_dir().map_err(|e| ReqlintError::Io {
            message: "Failed to get current directory".to_string(),
            source: e,
        })?;
        let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|path| ReqlintError::Io {
            message: format!("Current directory is not UTF-8: {}", path.display()),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "non-UTF-8 path"),
        })?;

        let output = OutputHandler::new();

        Ok(Self { cwd, output })
    }

    /// Resolve a manifest path relative to the working directory
    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.cwd.join(path)
        }
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> ReqlintResult<()> {
    match command {
        Commands::Check {
            file,
            format,
            strict,
        } => {
            info!("Checking manifest: {} (strict: {})", file, strict);
            check::execute(file, format, strict, ctx).await
        },
        Commands::List {
            file,
            applicable,
            python_version,
        } => {
            info!("Listing manifest: {} (applicable: {})", file, applicable);
            list::execute(file, applicable, python_version, ctx).await
        },
        Commands::Show { file, package } => {
            info!("Showing package '{}' in {}", package, file);
            show::execute(file, package, ctx).await
        },
        Commands::Version => {
            info!("Showing version information");
            show_version(ctx)
        },
    }
}

fn show_version(ctx: &CommandContext) -> ReqlintResult<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build_date = env!("BUILD_DATE");
    let target = format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS);

    ctx.output.info(&format!("reqlint v{}", version));
    ctx.output.info(&format!("Built: {}", build_date));
    ctx.output.info(&format!("Target: {}", target));
    ctx.output.info(&format!("Rust: {}", env!("RUSTC_VERSION")));

    Ok(())
}
