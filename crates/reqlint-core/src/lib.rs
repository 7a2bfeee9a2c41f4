//! # reqlint-core
//!
//! Core types shared across all reqlint crates.
//!
//! This crate provides:
//! - Version type for Python-scheme version strings
//! - Specifier and SpecifierSet types for version constraints
//! - Marker types for environment-marker expressions
//! - Requirement type for full dependency declarations
//! - ReqlintError enum for unified error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Version, Requirement, etc.)
//! - `error`: Error types and result aliases
//! - `utils`: Package-name validation and normalization

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{ReqlintError, ReqlintResult};
pub use types::{
    Marker, MarkerEnvironment, Requirement, Specifier, SpecifierSet, Version,
};
pub use utils::name::normalize_name;
