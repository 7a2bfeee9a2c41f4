//! `reqlint check` command implementation.
//!
//! Loads a manifest (following includes), runs the lint pass, and reports
//! findings as text or JSON. Exits with status 1 when any error-severity
//! finding exists.

use camino::Utf8PathBuf;
use reqlint_core::error::{ReqlintError, ReqlintResult};
use reqlint_manifest::lint::{has_errors, lint, Finding, LintOptions, Severity};
use reqlint_manifest::Manifest;
use serde::Serialize;

use super::CommandContext;
use crate::OutputFormat;

/// JSON report shape
#[derive(Serialize)]
struct Report<'a> {
    file: &'a str,
    declarations: usize,
    packages: usize,
    findings: &'a [Finding],
    errors: usize,
    warnings: usize,
    notes: usize,
}

/// Execute the `reqlint check` command
pub async fn execute(
    file: Utf8PathBuf,
    format: OutputFormat,
    strict: bool,
    ctx: &CommandContext,
) -> ReqlintResult<()> {
    let path = ctx.resolve(&file);
    let manifest = Manifest::load_from_file(&path).await?;
    let findings = lint(&manifest, LintOptions { strict });

    let errors = count(&findings, Severity::Error);
    let warnings = count(&findings, Severity::Warning);
    let notes = count(&findings, Severity::Note);

    match format {
        OutputFormat::Json => {
            let report = Report {
                file: file.as_str(),
                declarations: manifest.len(),
                packages: manifest.package_count(),
                findings: &findings,
                errors,
                warnings,
                notes,
            };
            let rendered = serde_json::to_string_pretty(&report).map_err(|e| {
                ReqlintError::ReportSerialize {
                    message: e.to_string(),
                }
            })?;
            println!("{}", rendered);
        },
        OutputFormat::Text => {
            for finding in &findings {
                let location = format!("{}:{}", finding.source, finding.line);
                let message = format!("{}: {}", location, finding.message);
                match finding.severity {
                    Severity::Error => ctx.output.error(&message),
                    Severity::Warning => ctx.output.warn(&message),
                    Severity::Note => ctx.output.info(&message),
                }
            }

            let summary = format!(
                "{} declarations, {} packages: {} errors, {} warnings, {} notes",
                manifest.len(),
                manifest.package_count(),
                errors,
                warnings,
                notes,
            );
            if errors > 0 {
                ctx.output.error(&summary);
            } else {
                ctx.output.success(&summary);
            }
        },
    }

    if has_errors(&findings) {
        std::process::exit(1);
    }
    Ok(())
}

fn count(findings: &[Finding], severity: Severity) -> usize {
    findings.iter().filter(|f| f.severity == severity).count()
}
