//! Error types and result aliases for reqlint operations.
//!
//! Provides a unified error type covering parse, manifest, and IO failures
//! with actionable error messages.

use crate::types::version::VersionError;
use thiserror::Error;

/// Unified error type for all reqlint operations
#[derive(Error, Debug)]
pub enum ReqlintError {
    // Parse errors
    #[error("Invalid package name: '{name}'")]
    InvalidName { name: String },

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("Invalid version specifier '{input}': {reason}")]
    InvalidSpecifier { input: String, reason: String },

    #[error("Invalid environment marker '{input}': {reason}")]
    InvalidMarker { input: String, reason: String },

    // Manifest errors
    #[error("Failed to parse {file} at line {line}: {message}")]
    ManifestParse {
        file: String,
        line: usize,
        message: String,
    },

    #[error("Circular include: {path}")]
    CircularInclude { path: String },

    #[error("Package '{name}' not found in manifest")]
    PackageNotFound { name: String },

    // Report errors
    #[error("Failed to serialize report: {message}")]
    ReportSerialize { message: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for reqlint operations
pub type ReqlintResult<T> = Result<T, ReqlintError>;

impl ReqlintError {
    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ReqlintError::InvalidName { .. } => {
                Some("Package names may only contain letters, digits, '-', '_', and '.'")
            },
            ReqlintError::InvalidSpecifier { .. } => {
                Some("Constraints look like '==1.2.3' or '>=1.4.1, <=1.10.1'")
            },
            ReqlintError::InvalidMarker { .. } => {
                Some("Markers look like \"python_version >= '3.7'\"")
            },
            ReqlintError::CircularInclude { .. } => {
                Some("Remove the -r line that re-includes an already-included file")
            },
            ReqlintError::PackageNotFound { .. } => {
                Some("Check the package name spelling; names are matched case-insensitively")
            },
            _ => None,
        }
    }
}
