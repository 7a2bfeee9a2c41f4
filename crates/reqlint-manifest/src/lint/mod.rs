//! Lint pass over a loaded manifest.
//!
//! Produces findings for malformed lines, duplicate declarations with
//! unsatisfiable constraint combinations, invalid markers, and (in strict
//! mode) unpinned declarations. Conflict detection is conservative: only
//! provably-empty constraint intersections are reported, so a satisfiable
//! pair of declarations is never flagged as conflicting.

use crate::manifest::{Manifest, ManifestEntry};
use camino::Utf8PathBuf;
use reqlint_core::error::ReqlintError;
use reqlint_core::types::{Op, Specifier, SpecifierSet, Version};
use serde::Serialize;
use tracing::debug;

/// Finding severity, worst first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// What a finding is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    MalformedSpecifier,
    InvalidMarker,
    ConflictingDuplicate,
    RedundantDuplicate,
    Unpinned,
    UnrecognizedOption,
}

/// One lint finding
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    pub message: String,
    /// Normalized package name, when the finding concerns one
    pub package: Option<String>,
    pub source: Utf8PathBuf,
    pub line: usize,
}

/// Lint configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct LintOptions {
    /// Also report declarations without an exact `==` pin
    pub strict: bool,
}

/// Run every check against a loaded manifest
pub fn lint(manifest: &Manifest, options: LintOptions) -> Vec<Finding> {
    let mut findings = Vec::new();

    check_invalid_lines(manifest, &mut findings);
    check_duplicates(manifest, &mut findings);
    check_options(manifest, &mut findings);
    if options.strict {
        check_unpinned(manifest, &mut findings);
    }

    debug!("Lint produced {} findings", findings.len());
    findings
}

/// True when any finding is an error
pub fn has_errors(findings: &[Finding]) -> bool {
    findings.iter().any(|f| f.severity == Severity::Error)
}

fn check_invalid_lines(manifest: &Manifest, findings: &mut Vec<Finding>) {
    for invalid in &manifest.invalid {
        let kind = match invalid.error {
            ReqlintError::InvalidMarker { .. } => FindingKind::InvalidMarker,
            _ => FindingKind::MalformedSpecifier,
        };
        findings.push(Finding {
            severity: Severity::Error,
            kind,
            message: format!("'{}': {}", invalid.text, invalid.error),
            package: None,
            source: invalid.source.clone(),
            line: invalid.line,
        });
    }
}

fn check_duplicates(manifest: &Manifest, findings: &mut Vec<Finding>) {
    for (name, entries) in manifest.packages() {
        if entries.len() < 2 {
            continue;
        }

        for (i, later) in entries.iter().enumerate().skip(1) {
            for earlier in &entries[..i] {
                let finding = if sets_disjoint(
                    &earlier.requirement.specifiers,
                    &later.requirement.specifiers,
                ) {
                    duplicate_finding(
                        Severity::Error,
                        FindingKind::ConflictingDuplicate,
                        name,
                        earlier,
                        later,
                        "no version satisfies both",
                    )
                } else {
                    duplicate_finding(
                        Severity::Warning,
                        FindingKind::RedundantDuplicate,
                        name,
                        earlier,
                        later,
                        "constraints overlap",
                    )
                };
                findings.push(finding);
            }
        }
    }
}

fn duplicate_finding(
    severity: Severity,
    kind: FindingKind,
    name: &str,
    earlier: &ManifestEntry,
    later: &ManifestEntry,
    detail: &str,
) -> Finding {
    Finding {
        severity,
        kind,
        message: format!(
            "'{}' declared again ({}): '{}' here vs '{}' at {}:{}",
            name,
            detail,
            later.requirement,
            earlier.requirement,
            earlier.source,
            earlier.line,
        ),
        package: Some(name.to_string()),
        source: later.source.clone(),
        line: later.line,
    }
}

fn check_options(manifest: &Manifest, findings: &mut Vec<Finding>) {
    for option in &manifest.options {
        findings.push(Finding {
            severity: Severity::Note,
            kind: FindingKind::UnrecognizedOption,
            message: format!("option line not checked: '{}'", option.option),
            package: None,
            source: option.source.clone(),
            line: option.line,
        });
    }
}

fn check_unpinned(manifest: &Manifest, findings: &mut Vec<Finding>) {
    for entry in &manifest.entries {
        if entry.requirement.specifiers.exact_pin().is_none() {
            findings.push(Finding {
                severity: Severity::Note,
                kind: FindingKind::Unpinned,
                message: format!("'{}' is not pinned to an exact version", entry.requirement),
                package: Some(entry.requirement.normalized_name()),
                source: entry.source.clone(),
                line: entry.line,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Constraint-intersection emptiness

#[derive(Debug, Clone)]
struct Bound {
    version: Version,
    inclusive: bool,
}

/// Decide whether two constraint sets are provably unsatisfiable together.
///
/// Pins (`==` without wildcard, `===`) are checked against every other
/// constraint. Without pins, ordered and prefix constraints reduce to lower
/// and upper bounds; `!=` never contributes to an emptiness proof.
fn sets_disjoint(a: &SpecifierSet, b: &SpecifierSet) -> bool {
    let all: Vec<&Specifier> = a.specifiers.iter().chain(b.specifiers.iter()).collect();

    let pins: Vec<&Version> = all
        .iter()
        .filter(|spec| matches!(spec.op, Op::Exact | Op::Arbitrary) && !spec.wildcard)
        .map(|spec| &spec.version)
        .collect();

    if !pins.is_empty() {
        // Satisfiable iff some pinned version passes every constraint
        return !pins
            .iter()
            .any(|pin| all.iter().all(|spec| spec.matches(pin)));
    }

    let mut lower: Option<Bound> = None;
    let mut upper: Option<Bound> = None;

    for spec in &all {
        for bound in lower_bound(spec) {
            if lower.as_ref().map_or(true, |cur| tighter_lower(&bound, cur)) {
                lower = Some(bound);
            }
        }
        for bound in upper_bound(spec) {
            if upper.as_ref().map_or(true, |cur| tighter_upper(&bound, cur)) {
                upper = Some(bound);
            }
        }
    }

    match (lower, upper) {
        (Some(lo), Some(hi)) => match lo.version.cmp(&hi.version) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => !(lo.inclusive && hi.inclusive),
            std::cmp::Ordering::Less => false,
        },
        _ => false,
    }
}

fn tighter_lower(candidate: &Bound, current: &Bound) -> bool {
    match candidate.version.cmp(&current.version) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Equal => !candidate.inclusive && current.inclusive,
        std::cmp::Ordering::Less => false,
    }
}

fn tighter_upper(candidate: &Bound, current: &Bound) -> bool {
    match candidate.version.cmp(&current.version) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Equal => !candidate.inclusive && current.inclusive,
        std::cmp::Ordering::Greater => false,
    }
}

fn lower_bound(spec: &Specifier) -> Option<Bound> {
    match spec.op {
        Op::Greater => Some(Bound {
            version: spec.version.clone(),
            inclusive: false,
        }),
        Op::GreaterEq | Op::Compatible => Some(Bound {
            version: spec.version.clone(),
            inclusive: true,
        }),
        Op::Exact if spec.wildcard => Some(Bound {
            version: prefix_floor(&spec.version),
            inclusive: true,
        }),
        _ => None,
    }
}

fn upper_bound(spec: &Specifier) -> Option<Bound> {
    match spec.op {
        Op::Less => Some(Bound {
            version: spec.version.clone(),
            inclusive: false,
        }),
        Op::LessEq => Some(Bound {
            version: spec.version.clone(),
            inclusive: true,
        }),
        Op::Compatible => {
            // ~=X.Y.Z allows up to the next-to-last segment bump
            let prefix = &spec.version.release[..spec.version.release.len() - 1];
            Some(Bound {
                version: bump(&spec.version, prefix),
                inclusive: false,
            })
        },
        Op::Exact if spec.wildcard => Some(Bound {
            version: bump(&spec.version, &spec.version.release),
            inclusive: false,
        }),
        _ => None,
    }
}

/// Smallest version matching a `==X.Y.*` prefix: `X.Y.dev0`, since dev
/// releases sort below the plain release they precede
fn prefix_floor(version: &Version) -> Version {
    let mut floor = Version::from_release(version.release.clone());
    floor.epoch = version.epoch;
    floor.dev = Some(0);
    floor
}

/// First version past a release prefix: bump the last segment
fn bump(version: &Version, prefix: &[u64]) -> Version {
    let mut release = prefix.to_vec();
    if let Some(last) = release.last_mut() {
        *last += 1;
    } else {
        release.push(u64::MAX);
    }
    let mut bumped = Version::from_release(release);
    bumped.epoch = version.epoch;
    bumped
}
