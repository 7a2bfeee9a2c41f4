//! Version constraint types.
//!
//! A `Specifier` pairs a comparison operator with a version; a `SpecifierSet`
//! is a comma-joined list of specifiers combined with logical AND.

use super::version::{Version, VersionError};
use crate::error::ReqlintError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison operator for version constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Exact,      // ==1.0
    NotEqual,   // !=1.0
    LessEq,     // <=1.0
    GreaterEq,  // >=1.0
    Less,       // <1.0
    Greater,    // >1.0
    Compatible, // ~=1.4.1
    Arbitrary,  // ===1.0
}

/// Individual version constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specifier {
    pub op: Op,
    pub version: Version,
    /// True for prefix constraints like `==1.4.*` (only with `==` / `!=`)
    pub wildcard: bool,
}

/// Comma-joined constraints, all of which must hold
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecifierSet {
    pub specifiers: Vec<Specifier>,
}

impl Op {
    /// The operator as written in a manifest
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Exact => "==",
            Op::NotEqual => "!=",
            Op::LessEq => "<=",
            Op::GreaterEq => ">=",
            Op::Less => "<",
            Op::Greater => ">",
            Op::Compatible => "~=",
            Op::Arbitrary => "===",
        }
    }
}

impl Specifier {
    /// Parse a single constraint like `>=1.4.1` or `==1.4.*`
    pub fn parse(input: &str) -> Result<Self, ReqlintError> {
        let input = input.trim();

        // Longest operators first so `==` is not read as two `=`s
        let (op, version_str) = if let Some(stripped) = input.strip_prefix("===") {
            (Op::Arbitrary, stripped)
        } else if let Some(stripped) = input.strip_prefix("==") {
            (Op::Exact, stripped)
        } else if let Some(stripped) = input.strip_prefix("!=") {
            (Op::NotEqual, stripped)
        } else if let Some(stripped) = input.strip_prefix("<=") {
            (Op::LessEq, stripped)
        } else if let Some(stripped) = input.strip_prefix(">=") {
            (Op::GreaterEq, stripped)
        } else if let Some(stripped) = input.strip_prefix("~=") {
            (Op::Compatible, stripped)
        } else if let Some(stripped) = input.strip_prefix('<') {
            (Op::Less, stripped)
        } else if let Some(stripped) = input.strip_prefix('>') {
            (Op::Greater, stripped)
        } else {
            return Err(ReqlintError::InvalidSpecifier {
                input: input.to_string(),
                reason: "missing comparison operator".to_string(),
            });
        };

        let version_str = version_str.trim();
        let (version_str, wildcard) = match version_str.strip_suffix(".*") {
            Some(prefix) => {
                if !matches!(op, Op::Exact | Op::NotEqual) {
                    return Err(ReqlintError::InvalidSpecifier {
                        input: input.to_string(),
                        reason: format!("wildcard not allowed with `{}`", op.as_str()),
                    });
                }
                (prefix, true)
            },
            None => (version_str, false),
        };

        let version: Version = version_str.parse().map_err(|e: VersionError| {
            ReqlintError::InvalidSpecifier {
                input: input.to_string(),
                reason: e.to_string(),
            }
        })?;

        if op == Op::Compatible && version.release.len() < 2 {
            return Err(ReqlintError::InvalidSpecifier {
                input: input.to_string(),
                reason: "`~=` requires at least two release segments".to_string(),
            });
        }

        Ok(Specifier {
            op,
            version,
            wildcard,
        })
    }

    /// Check if a version satisfies this constraint
    pub fn matches(&self, version: &Version) -> bool {
        match self.op {
            Op::Exact if self.wildcard => self.matches_prefix(version),
            Op::NotEqual if self.wildcard => !self.matches_prefix(version),
            Op::Exact => self.matches_exact(version),
            Op::NotEqual => !self.matches_exact(version),
            Op::Less => version < &self.version,
            Op::LessEq => version <= &self.version,
            Op::Greater => version > &self.version,
            Op::GreaterEq => version >= &self.version,
            Op::Compatible => self.matches_compatible(version),
            Op::Arbitrary => version == &self.version,
        }
    }

    /// Equality match, ignoring the candidate's local segment unless the
    /// constraint itself carries one
    fn matches_exact(&self, version: &Version) -> bool {
        if self.version.local.is_some() {
            return version == &self.version;
        }
        version.epoch == self.version.epoch
            && version.cmp_release(&self.version).is_eq()
            && version.pre == self.version.pre
            && version.post == self.version.post
            && version.dev == self.version.dev
    }

    /// Prefix match for `==X.Y.*`
    fn matches_prefix(&self, version: &Version) -> bool {
        version.epoch == self.version.epoch && version.release_starts_with(&self.version.release)
    }

    /// Compatible-release match: `~=X.Y.Z` means `>=X.Y.Z` and `==X.Y.*`
    fn matches_compatible(&self, version: &Version) -> bool {
        let prefix = &self.version.release[..self.version.release.len() - 1];
        version >= &self.version
            && version.epoch == self.version.epoch
            && version.release_starts_with(prefix)
    }
}

impl SpecifierSet {
    /// Parse a comma-joined constraint list like `>=1.4.1, <=1.10.1`
    pub fn parse(input: &str) -> Result<Self, ReqlintError> {
        let input = input.trim();

        // An empty set matches any version
        if input.is_empty() {
            return Ok(SpecifierSet::default());
        }

        let specifiers = input
            .split(',')
            .map(Specifier::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SpecifierSet { specifiers })
    }

    /// Check if a version satisfies every constraint in the set
    pub fn matches(&self, version: &Version) -> bool {
        self.specifiers.iter().all(|spec| spec.matches(version))
    }

    /// True when the set contains no constraints
    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }

    /// The pinned version, if the set contains an `==` or `===` pin
    /// without wildcard
    pub fn exact_pin(&self) -> Option<&Version> {
        self.specifiers
            .iter()
            .find(|spec| matches!(spec.op, Op::Exact | Op::Arbitrary) && !spec.wildcard)
            .map(|spec| &spec.version)
    }
}

impl FromStr for SpecifierSet {
    type Err = ReqlintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SpecifierSet::parse(s)
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)?;
        if self.wildcard {
            write!(f, ".*")?;
        }
        Ok(())
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for spec in &self.specifiers {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}", spec)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_specifier_parsing() {
        let spec = Specifier::parse("==4.0.1").unwrap();
        assert_eq!(spec.op, Op::Exact);
        assert_eq!(spec.version, v("4.0.1"));
        assert!(!spec.wildcard);
    }

    #[test]
    fn test_specifier_set_and_semantics() {
        let set = SpecifierSet::parse(">=1.4.1, <=1.10.1").unwrap();
        assert_eq!(set.specifiers.len(), 2);
        assert_eq!(set.specifiers[0].op, Op::GreaterEq);
        assert_eq!(set.specifiers[1].op, Op::LessEq);

        assert!(set.matches(&v("1.4.1")));
        assert!(set.matches(&v("1.7.0")));
        assert!(set.matches(&v("1.10.1")));
        assert!(!set.matches(&v("1.4.0")));
        assert!(!set.matches(&v("1.11.0")));
    }

    #[test]
    fn test_exact_match_zero_padding() {
        let spec = Specifier::parse("==1.3").unwrap();
        assert!(spec.matches(&v("1.3")));
        assert!(spec.matches(&v("1.3.0")));
        assert!(!spec.matches(&v("1.3.1")));
    }

    #[test]
    fn test_exact_ignores_candidate_local() {
        let spec = Specifier::parse("==1.2.3").unwrap();
        assert!(spec.matches(&v("1.2.3+cu117")));

        let spec = Specifier::parse("==1.2.3+cu117").unwrap();
        assert!(spec.matches(&v("1.2.3+cu117")));
        assert!(!spec.matches(&v("1.2.3")));
    }

    #[test]
    fn test_wildcard() {
        let spec = Specifier::parse("==1.4.*").unwrap();
        assert!(spec.wildcard);
        assert!(spec.matches(&v("1.4")));
        assert!(spec.matches(&v("1.4.9")));
        assert!(!spec.matches(&v("1.5.0")));

        let spec = Specifier::parse("!=1.4.*").unwrap();
        assert!(!spec.matches(&v("1.4.2")));
        assert!(spec.matches(&v("1.5.0")));
    }

    #[test]
    fn test_wildcard_rejected_on_ordered_ops() {
        assert!(Specifier::parse(">=1.4.*").is_err());
    }

    #[test]
    fn test_compatible_release() {
        let spec = Specifier::parse("~=1.4.2").unwrap();
        assert!(spec.matches(&v("1.4.2")));
        assert!(spec.matches(&v("1.4.9")));
        assert!(!spec.matches(&v("1.5.0")));
        assert!(!spec.matches(&v("1.4.1")));

        let spec = Specifier::parse("~=2.2").unwrap();
        assert!(spec.matches(&v("2.2")));
        assert!(spec.matches(&v("2.9")));
        assert!(!spec.matches(&v("3.0")));

        assert!(Specifier::parse("~=2").is_err());
    }

    #[test]
    fn test_missing_operator() {
        assert!(Specifier::parse("1.0.0").is_err());
    }

    #[test]
    fn test_empty_set_matches_everything() {
        let set = SpecifierSet::parse("").unwrap();
        assert!(set.is_empty());
        assert!(set.matches(&v("0.0.1")));
        assert!(set.matches(&v("99.99")));
    }

    #[test]
    fn test_exact_pin() {
        let set = SpecifierSet::parse("==1.3.5").unwrap();
        assert_eq!(set.exact_pin(), Some(&v("1.3.5")));

        let set = SpecifierSet::parse(">=1.0").unwrap();
        assert_eq!(set.exact_pin(), None);
    }

    #[test]
    fn test_display_round_trip() {
        let set = SpecifierSet::parse(" >=1.4.1 , <=1.10.1 ").unwrap();
        assert_eq!(set.to_string(), ">=1.4.1, <=1.10.1");

        let set = SpecifierSet::parse("==1.4.*").unwrap();
        assert_eq!(set.to_string(), "==1.4.*");
    }
}
