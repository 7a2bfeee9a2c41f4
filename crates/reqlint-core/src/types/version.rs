//! Python-scheme version type.
//!
//! Provides a Version type following the versioning scheme used by Python
//! package manifests: optional epoch, dotted release segments of arbitrary
//! length, and optional pre-release, post-release, dev-release, and local
//! segments.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A version of the form `[N!]N(.N)*[{a|b|rc}N][.postN][.devN][+local]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub epoch: u64,
    pub release: Vec<u64>,
    pub pre: Option<(PreKind, u64)>,
    pub post: Option<u64>,
    pub dev: Option<u64>,
    pub local: Option<String>,
}

/// Pre-release phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PreKind {
    Alpha, // a1
    Beta,  // b1
    Rc,    // rc1
}

/// Version parsing and validation errors
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Invalid version format: {input}")]
    InvalidFormat { input: String },

    #[error("Invalid number in version: {component}")]
    InvalidNumber { component: String },

    #[error("Unknown release suffix: {suffix}")]
    UnknownSuffix { suffix: String },

    #[error("Invalid local segment: {local}")]
    InvalidLocal { local: String },
}

impl Version {
    /// Create a plain release version from its segments
    pub fn from_release(release: Vec<u64>) -> Self {
        Self {
            epoch: 0,
            release,
            pre: None,
            post: None,
            dev: None,
            local: None,
        }
    }

    /// Check if this is a pre-release or dev-release version
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// Release segment at `idx`, padding missing segments with zero
    pub fn release_segment(&self, idx: usize) -> u64 {
        self.release.get(idx).copied().unwrap_or(0)
    }

    /// Compare release segments only, zero-padding the shorter side
    pub fn cmp_release(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        for i in 0..len {
            match self.release_segment(i).cmp(&other.release_segment(i)) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    /// Check that the first `n` release segments equal `prefix`, zero-padded
    pub fn release_starts_with(&self, prefix: &[u64]) -> bool {
        prefix
            .iter()
            .enumerate()
            .all(|(i, seg)| self.release_segment(i) == *seg)
    }

    /// Precedence for comparison, ignoring the local segment
    fn precedence_cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.cmp_release(other))
            .then_with(|| self.phase_key().cmp(&other.phase_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| dev_key(self.dev).cmp(&dev_key(other.dev)))
    }

    /// Ordering rank among dev, pre-release, and final at equal release.
    ///
    /// A bare dev release sorts before any pre-release, which sorts before
    /// the final release.
    fn phase_key(&self) -> PhaseKey {
        match self.pre {
            Some((kind, num)) => PhaseKey::Pre(kind, num),
            None if self.dev.is_some() && self.post.is_none() => PhaseKey::Dev,
            None => PhaseKey::Final,
        }
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum PhaseKey {
    Dev,
    Pre(PreKind, u64),
    Final,
}

/// Dev releases sort before the release they precede
fn dev_key(dev: Option<u64>) -> (u8, u64) {
    match dev {
        Some(n) => (0, n),
        None => (1, 0),
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence_cmp(other).then_with(|| {
            // local segments tie-break lexically, absent sorting first
            self.local.cmp(&other.local)
        })
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().trim_start_matches('v').to_ascii_lowercase();
        if input.is_empty() {
            return Err(VersionError::InvalidFormat { input: s.to_string() });
        }

        // Split off the local segment
        let (rest, local) = match input.split_once('+') {
            Some((r, l)) => {
                if l.is_empty() || !l.chars().all(|c| c.is_ascii_alphanumeric() || c == '.') {
                    return Err(VersionError::InvalidLocal {
                        local: l.to_string(),
                    });
                }
                (r, Some(l.to_string()))
            },
            None => (input.as_str(), None),
        };

        // Split off the epoch
        let (epoch, rest) = match rest.split_once('!') {
            Some((e, r)) => {
                let epoch = e.parse().map_err(|_| VersionError::InvalidNumber {
                    component: e.to_string(),
                })?;
                (epoch, r)
            },
            None => (0, rest),
        };

        // Release segments: digits separated by dots
        let mut release = Vec::new();
        let mut rest = rest;
        loop {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                return Err(VersionError::InvalidFormat { input: s.to_string() });
            }
            release.push(digits.parse().map_err(|_| VersionError::InvalidNumber {
                component: digits.clone(),
            })?);
            rest = &rest[digits.len()..];

            match rest.strip_prefix('.') {
                Some(after) if after.starts_with(|c: char| c.is_ascii_digit()) => rest = after,
                _ => break,
            }
        }

        // Suffixes: pre-release, post-release, dev-release
        let mut pre = None;
        let mut post = None;
        let mut dev = None;
        while !rest.is_empty() {
            rest = rest.trim_start_matches(['.', '-', '_']);
            let tag: String = rest.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
            if tag.is_empty() {
                return Err(VersionError::InvalidFormat { input: s.to_string() });
            }
            rest = &rest[tag.len()..];
            let sep_skipped = rest.trim_start_matches(['.', '-', '_']);
            let digits: String = sep_skipped
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            rest = &sep_skipped[digits.len()..];
            let num: u64 = if digits.is_empty() {
                0
            } else {
                digits.parse().map_err(|_| VersionError::InvalidNumber {
                    component: digits.clone(),
                })?
            };

            match tag.as_str() {
                "a" | "alpha" => pre = Some((PreKind::Alpha, num)),
                "b" | "beta" => pre = Some((PreKind::Beta, num)),
                "rc" | "c" | "pre" | "preview" => pre = Some((PreKind::Rc, num)),
                "post" | "r" | "rev" => post = Some(num),
                "dev" => dev = Some(num),
                _ => return Err(VersionError::UnknownSuffix { suffix: tag }),
            }
        }

        Ok(Version {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }

        let mut first = true;
        for seg in &self.release {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", seg)?;
            first = false;
        }

        if let Some((kind, num)) = self.pre {
            let tag = match kind {
                PreKind::Alpha => "a",
                PreKind::Beta => "b",
                PreKind::Rc => "rc",
            };
            write!(f, "{}{}", tag, num)?;
        }

        if let Some(post) = self.post {
            write!(f, ".post{}", post)?;
        }

        if let Some(dev) = self.dev {
            write!(f, ".dev{}", dev)?;
        }

        if let Some(ref local) = self.local {
            write!(f, "+{}", local)?;
        }

        Ok(())
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn version_strategy() -> impl Strategy<Value = Version> {
        (
            0u64..10,
            prop::collection::vec(0u64..1000, 1..5),
            prop::option::of((
                prop_oneof![
                    Just(PreKind::Alpha),
                    Just(PreKind::Beta),
                    Just(PreKind::Rc)
                ],
                0u64..100,
            )),
            prop::option::of(0u64..100),
            prop::option::of(0u64..100),
            prop::option::of("[a-z0-9]{1,8}"),
        )
            .prop_map(|(epoch, release, pre, post, dev, local)| Version {
                epoch,
                release,
                pre,
                post,
                dev,
                local,
            })
    }

    proptest! {
        #[test]
        fn version_round_trip(original in version_strategy()) {
            let serialized = original.to_string();
            let parsed: Version = serialized.parse().unwrap();

            prop_assert_eq!(parsed, original);
        }
    }

    proptest! {
        #[test]
        fn version_comparison_transitivity(
            a in version_strategy(),
            b in version_strategy(),
            c in version_strategy(),
        ) {
            if a < b && b < c {
                prop_assert!(a < c, "Transitivity violated: {} < {} < {} but {} >= {}", a, b, c, a, c);
            }

            if a > b && b > c {
                prop_assert!(a > c, "Transitivity violated: {} > {} > {} but {} <= {}", a, b, c, a, c);
            }
        }
    }
}
