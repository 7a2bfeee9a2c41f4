//! Manifest file model for reqlint
//!
//! This crate handles reading requirements manifests: logical-line assembly,
//! per-line requirement parsing, `-r` includes, and the lint pass over a
//! loaded manifest.

pub mod lint;
pub mod manifest;
pub mod reader;

// Re-export main types
pub use lint::{Finding, FindingKind, LintOptions, Severity};
pub use manifest::{InvalidLine, Manifest, ManifestEntry, ManifestOption};
pub use reader::LogicalLine;

use reqlint_core::error::ReqlintError;

/// Result type for manifest operations
pub type ManifestResult<T> = Result<T, ReqlintError>;
