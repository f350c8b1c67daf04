//! PathResolver trait for turning raw attribute strings into paths.
//!
//! The builder never touches the filesystem itself. Whenever a `set` operation
//! declares a path parameter, the raw string is handed to the resolver that is
//! installed on the builder, together with a diagnostic label of the form
//! `owner.attribute`.

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for path resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path '{path}' for {label} escapes the base directory")]
    Escapes { path: String, label: String },

    #[error("no mapping for path '{path}' ({label})")]
    Unmapped { path: String, label: String },

    #[error("failed to resolve '{path}' for {label}: {message}")]
    Io {
        path: String,
        label: String,
        message: String,
    },
}

/// A collaborator that resolves raw path strings.
///
/// # Implementations
///
/// - `MappedPathResolver`: fixed in-memory mapping (always available)
/// - `WorkingDirResolver` / `BaseDirResolver` in `trellis-resource`
pub trait PathResolver: Debug {
    /// Resolve `raw` into an absolute path.
    ///
    /// `label` names the owning object and attribute, for diagnostics.
    fn resolve(&self, raw: &str, label: &str) -> Result<PathBuf, PathError>;

    /// Returns a human-readable name for this resolver (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// A resolver backed by an explicit table of raw string to path.
///
/// Strings that were not added fail with `PathError::Unmapped`.
#[derive(Debug, Default, Clone)]
pub struct MappedPathResolver {
    entries: HashMap<String, PathBuf>,
}

impl MappedPathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mapping, replacing any previous one for `raw`.
    pub fn insert(&mut self, raw: impl Into<String>, path: impl Into<PathBuf>) {
        self.entries.insert(raw.into(), path.into());
    }

    /// Builder-style variant of [`MappedPathResolver::insert`].
    pub fn with(mut self, raw: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.insert(raw, path);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PathResolver for MappedPathResolver {
    fn resolve(&self, raw: &str, label: &str) -> Result<PathBuf, PathError> {
        self.entries
            .get(raw)
            .cloned()
            .ok_or_else(|| PathError::Unmapped {
                path: raw.to_string(),
                label: label.to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "MappedPathResolver"
    }
}
