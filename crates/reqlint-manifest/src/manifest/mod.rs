//! Loaded manifest model.
//!
//! A `Manifest` holds parsed dependency declarations in insertion order,
//! indexed by normalized package name. Loading is lenient at the line level:
//! lines that fail to parse are recorded as `InvalidLine`s for the lint pass
//! instead of aborting the load. IO failures and include cycles are hard
//! errors.

use crate::reader::{logical_lines, LogicalLine};
use crate::ManifestResult;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use reqlint_core::error::ReqlintError;
use reqlint_core::types::Requirement;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

/// One parsed dependency declaration with its source position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestEntry {
    pub requirement: Requirement,
    pub source: Utf8PathBuf,
    pub line: usize,
}

/// A non-include option line (`--index-url ...`), kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestOption {
    pub option: String,
    pub source: Utf8PathBuf,
    pub line: usize,
}

/// A line that failed to parse as a dependency specifier
#[derive(Debug, Serialize)]
pub struct InvalidLine {
    pub text: String,
    pub source: Utf8PathBuf,
    pub line: usize,
    #[serde(serialize_with = "serialize_error")]
    pub error: ReqlintError,
}

fn serialize_error<S: serde::Serializer>(
    error: &ReqlintError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// A loaded requirements manifest
#[derive(Debug, Default, Serialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
    pub options: Vec<ManifestOption>,
    pub invalid: Vec<InvalidLine>,
    /// Normalized package name -> indices into `entries`
    #[serde(skip)]
    index: IndexMap<String, Vec<usize>>,
}

impl Manifest {
    /// Parse manifest content without resolving includes.
    ///
    /// Include directives are recorded as options so nothing is silently
    /// dropped; use `load_from_file` to follow them.
    pub fn parse_str(content: &str, source: &Utf8Path) -> Self {
        let mut manifest = Manifest::default();
        for line in logical_lines(content) {
            manifest.ingest_line(line, source);
        }
        manifest
    }

    /// Load a manifest file, following `-r` includes relative to the
    /// including file
    pub async fn load_from_file(path: &Utf8Path) -> ManifestResult<Self> {
        let mut manifest = Manifest::default();
        let mut stack = Vec::new();
        load_into(&mut manifest, path.to_owned(), &mut stack).await?;
        Ok(manifest)
    }

    /// Number of declarations, counting duplicates
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct packages under name normalization
    pub fn package_count(&self) -> usize {
        self.index.len()
    }

    /// All declarations of a package, matched under name normalization
    pub fn get(&self, name: &str) -> Vec<&ManifestEntry> {
        let normalized = reqlint_core::normalize_name(name);
        self.index
            .get(&normalized)
            .map(|indices| indices.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    /// Iterate normalized names with their declarations, in first-seen order
    pub fn packages(&self) -> impl Iterator<Item = (&str, Vec<&ManifestEntry>)> {
        self.index.iter().map(|(name, indices)| {
            let entries = indices.iter().map(|&i| &self.entries[i]).collect();
            (name.as_str(), entries)
        })
    }

    fn ingest_line(&mut self, line: LogicalLine, source: &Utf8Path) {
        if line.text.starts_with('-') {
            self.options.push(ManifestOption {
                option: line.text,
                source: source.to_owned(),
                line: line.line,
            });
            return;
        }

        match line.text.parse::<Requirement>() {
            Ok(requirement) => self.push_entry(ManifestEntry {
                requirement,
                source: source.to_owned(),
                line: line.line,
            }),
            Err(error) => {
                warn!("{}:{}: {}", source, line.line, error);
                self.invalid.push(InvalidLine {
                    text: line.text,
                    source: source.to_owned(),
                    line: line.line,
                    error,
                });
            },
        }
    }

    fn push_entry(&mut self, entry: ManifestEntry) {
        let normalized = entry.requirement.normalized_name();
        let idx = self.entries.len();
        self.entries.push(entry);
        self.index.entry(normalized).or_default().push(idx);
    }
}

/// Parse an include directive; returns the included path if this is one
fn include_target(option: &str) -> Option<&str> {
    let rest = option
        .strip_prefix("--requirement")
        .or_else(|| option.strip_prefix("-r"))?;

    match rest.strip_prefix('=') {
        Some(path) => Some(path.trim()),
        None if rest.starts_with(char::is_whitespace) => Some(rest.trim()),
        _ => None,
    }
}

/// Recursive include loading; boxed because async fns cannot recurse directly
fn load_into<'a>(
    manifest: &'a mut Manifest,
    path: Utf8PathBuf,
    stack: &'a mut Vec<Utf8PathBuf>,
) -> Pin<Box<dyn Future<Output = ManifestResult<()>> + 'a>> {
    Box::pin(async move {
        let resolved = path
            .canonicalize_utf8()
            .map_err(|e| ReqlintError::io(format!("Failed to resolve {}", path), e))?;

        if stack.contains(&resolved) {
            return Err(ReqlintError::CircularInclude {
                path: path.to_string(),
            });
        }
        stack.push(resolved.clone());

        debug!("Loading manifest: {}", resolved);
        let content = tokio::fs::read_to_string(&resolved)
            .await
            .map_err(|e| ReqlintError::io(format!("Failed to read {}", resolved), e))?;

        for line in logical_lines(&content) {
            if line.text.starts_with('-') {
                if let Some(target) = include_target(&line.text) {
                    let included = match resolved.parent() {
                        Some(dir) => dir.join(target),
                        None => Utf8PathBuf::from(target),
                    };
                    load_into(manifest, included, stack).await?;
                    continue;
                }
            }
            manifest.ingest_line(line, &path);
        }

        stack.pop();
        Ok(())
    })
}
