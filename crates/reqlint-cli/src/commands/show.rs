//! `reqlint show` command implementation.
//!
//! Prints every declaration of one package, matched under name
//! normalization, with source locations.

use camino::Utf8PathBuf;
use reqlint_core::error::{ReqlintError, ReqlintResult};
use reqlint_manifest::Manifest;

use super::CommandContext;

/// Execute the `reqlint show` command
pub async fn execute(
    file: Utf8PathBuf,
    package: String,
    ctx: &CommandContext,
) -> ReqlintResult<()> {
    let path = ctx.resolve(&file);
    let manifest = Manifest::load_from_file(&path).await?;

    let entries = manifest.get(&package);
    if entries.is_empty() {
        return Err(ReqlintError::PackageNotFound { name: package });
    }

    for entry in entries {
        ctx.output.info(&format!(
            "{}:{}: {}",
            entry.source, entry.line, entry.requirement
        ));
    }

    Ok(())
}
