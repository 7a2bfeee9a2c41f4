//! Dependency declaration type.
//!
//! A `Requirement` is one parsed manifest line: a package name, optional
//! extras, an optional constraint set, and an optional environment marker.

use super::marker::Marker;
use super::specifier::SpecifierSet;
use crate::error::ReqlintError;
use crate::utils::name::{is_valid_name, normalize_name};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One dependency declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Package name as written in the manifest
    pub name: String,
    pub extras: Vec<String>,
    pub specifiers: SpecifierSet,
    pub marker: Option<Marker>,
}

impl Requirement {
    /// Create an unconstrained requirement
    pub fn new(name: String) -> Self {
        Self {
            name,
            extras: Vec::new(),
            specifiers: SpecifierSet::default(),
            marker: None,
        }
    }

    /// Add a constraint set to this requirement
    pub fn with_specifiers(mut self, specifiers: SpecifierSet) -> Self {
        self.specifiers = specifiers;
        self
    }

    /// Add an environment marker to this requirement
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// The normalized package name used for comparisons and lookups
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Whether this requirement refers to the same package as `other`
    pub fn same_package(&self, other: &Requirement) -> bool {
        self.normalized_name() == other.normalized_name()
    }
}

impl FromStr for Requirement {
    type Err = ReqlintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(ReqlintError::InvalidSpecifier {
                input: s.to_string(),
                reason: "empty requirement".to_string(),
            });
        }

        // Marker comes after the first `;`
        let (spec_part, marker_part) = match input.split_once(';') {
            Some((spec, marker)) => (spec.trim(), Some(marker.trim())),
            None => (input, None),
        };

        // Name: leading run of name characters
        let name_len = spec_part
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(spec_part.len());
        let name = &spec_part[..name_len];
        if !is_valid_name(name) {
            return Err(ReqlintError::InvalidName {
                name: name.to_string(),
            });
        }

        let mut rest = spec_part[name_len..].trim_start();

        // Extras: bracketed, comma-separated
        let mut extras = Vec::new();
        if let Some(after) = rest.strip_prefix('[') {
            let end = after.find(']').ok_or_else(|| ReqlintError::InvalidSpecifier {
                input: input.to_string(),
                reason: "unclosed extras bracket".to_string(),
            })?;
            for extra in after[..end].split(',') {
                let extra = extra.trim();
                if !is_valid_name(extra) {
                    return Err(ReqlintError::InvalidName {
                        name: extra.to_string(),
                    });
                }
                extras.push(extra.to_string());
            }
            rest = after[end + 1..].trim_start();
        }

        // Constraints, optionally parenthesized
        let spec_text = rest
            .strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'))
            .unwrap_or(rest);
        let specifiers = SpecifierSet::parse(spec_text)?;

        let marker = marker_part.map(Marker::parse).transpose()?;

        Ok(Requirement {
            name: name.to_string(),
            extras,
            specifiers,
            marker,
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        if !self.specifiers.is_empty() {
            write!(f, "{}", self.specifiers)?;
        }
        if let Some(ref marker) = self.marker {
            write!(f, "; {}", marker)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::specifier::Op;

    #[test]
    fn test_pinned_requirement() {
        let req: Requirement = "flake8==4.0.1".parse().unwrap();

        assert_eq!(req.name, "flake8");
        assert_eq!(req.specifiers.specifiers.len(), 1);
        assert_eq!(req.specifiers.specifiers[0].op, Op::Exact);
        assert_eq!(req.specifiers.to_string(), "==4.0.1");
        assert!(req.marker.is_none());
        assert!(req.extras.is_empty());
    }

    #[test]
    fn test_requirement_with_marker() {
        let req: Requirement = "pandas==1.3.5; python_version >= '3.7'".parse().unwrap();

        assert_eq!(req.name, "pandas");
        assert_eq!(req.specifiers.to_string(), "==1.3.5");
        let marker = req.marker.unwrap();
        assert_eq!(marker.to_string(), "python_version >= '3.7'");
    }

    #[test]
    fn test_requirement_with_range() {
        let req: Requirement = "scipy>=1.4.1, <=1.10.1".parse().unwrap();

        assert_eq!(req.name, "scipy");
        assert_eq!(req.specifiers.specifiers.len(), 2);
        assert_eq!(req.specifiers.specifiers[0].op, Op::GreaterEq);
        assert_eq!(req.specifiers.specifiers[1].op, Op::LessEq);
    }

    #[test]
    fn test_bare_name() {
        let req: Requirement = "requests".parse().unwrap();
        assert_eq!(req.name, "requests");
        assert!(req.specifiers.is_empty());
    }

    #[test]
    fn test_extras() {
        let req: Requirement = "uvicorn[standard]>=0.15".parse().unwrap();
        assert_eq!(req.name, "uvicorn");
        assert_eq!(req.extras, vec!["standard".to_string()]);

        let req: Requirement = "pkg[a, b]".parse().unwrap();
        assert_eq!(req.extras, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_parenthesized_specifiers() {
        let req: Requirement = "requests (>=2.0, <3.0)".parse().unwrap();
        assert_eq!(req.name, "requests");
        assert_eq!(req.specifiers.specifiers.len(), 2);
    }

    #[test]
    fn test_whitespace_insignificant() {
        let a: Requirement = "scipy>=1.4.1,<=1.10.1".parse().unwrap();
        let b: Requirement = "  scipy >= 1.4.1 , <= 1.10.1  ".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalized_name() {
        let a: Requirement = "Flake8_Docstrings".parse().unwrap();
        let b: Requirement = "flake8-docstrings".parse().unwrap();
        assert_eq!(a.normalized_name(), "flake8-docstrings");
        assert!(a.same_package(&b));
    }

    #[test]
    fn test_invalid_requirements() {
        assert!("".parse::<Requirement>().is_err());
        assert!("-flake8==1.0".parse::<Requirement>().is_err());
        assert!("flake8==".parse::<Requirement>().is_err());
        assert!("flake8 @@ 1.0".parse::<Requirement>().is_err());
        assert!("pkg[unclosed==1.0".parse::<Requirement>().is_err());
        assert!("pandas==1.3.5; spam >= '3.7'".parse::<Requirement>().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let req: Requirement = "pandas==1.3.5; python_version >= '3.7'".parse().unwrap();
        let json = serde_json::to_string(&req).unwrap();
        let back: Requirement = serde_json::from_str(&json).unwrap();
        assert_eq!(req, back);
    }

    #[test]
    fn test_display_round_trip() {
        for line in [
            "flake8==4.0.1",
            "scipy>=1.4.1, <=1.10.1",
            "pandas==1.3.5; python_version >= '3.7'",
            "uvicorn[standard]>=0.15",
        ] {
            let req: Requirement = line.parse().unwrap();
            let redisplayed: Requirement = req.to_string().parse().unwrap();
            assert_eq!(req, redisplayed);
        }
    }
}
