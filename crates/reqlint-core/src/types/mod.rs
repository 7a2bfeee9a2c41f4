//! Core data types for requirements manifests.
//!
//! This module provides the fundamental types used throughout reqlint:
//! - Version types for Python-scheme versions
//! - Specifier types for version constraints
//! - Marker types for environment markers
//! - Requirement for a full dependency declaration

pub mod marker;
pub mod requirement;
pub mod specifier;
pub mod version;

// Re-export all public types
pub use marker::{Marker, MarkerEnvironment, MarkerExpr, MarkerOp, MarkerOperand, MarkerVar};
pub use requirement::Requirement;
pub use specifier::{Op, Specifier, SpecifierSet};
pub use version::{PreKind, Version, VersionError};
