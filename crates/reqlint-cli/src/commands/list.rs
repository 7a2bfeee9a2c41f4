//! `reqlint list` command implementation.
//!
//! Prints the parsed declarations of a manifest. With `--applicable`, only
//! declarations whose environment marker holds against the host environment
//! (with the given Python version) are shown.

use camino::Utf8PathBuf;
use reqlint_core::error::ReqlintResult;
use reqlint_core::MarkerEnvironment;
use reqlint_manifest::Manifest;

use super::CommandContext;

/// Execute the `reqlint list` command
pub async fn execute(
    file: Utf8PathBuf,
    applicable: bool,
    python_version: String,
    ctx: &CommandContext,
) -> ReqlintResult<()> {
    let path = ctx.resolve(&file);
    let manifest = Manifest::load_from_file(&path).await?;

    for invalid in &manifest.invalid {
        ctx.output.warn(&format!(
            "{}:{}: skipping unparsable line '{}'",
            invalid.source, invalid.line, invalid.text
        ));
    }

    let env = MarkerEnvironment::host(&python_version);
    let mut shown = 0;

    for entry in &manifest.entries {
        if applicable {
            let holds = entry
                .requirement
                .marker
                .as_ref()
                .map_or(true, |marker| marker.evaluate(&env));
            if !holds {
                continue;
            }
        }
        ctx.output.info(&entry.requirement.to_string());
        shown += 1;
    }

    let suffix = if applicable {
        format!(" applicable to python {}", python_version)
    } else {
        String::new()
    };
    ctx.output.success(&format!(
        "{} of {} declarations{}",
        shown,
        manifest.len(),
        suffix
    ));

    Ok(())
}
