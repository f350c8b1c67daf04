//! Filesystem-based path resolvers for native platforms.
//!
//! Both resolvers work lexically: the resolved path does not need to exist,
//! and `.`/`..` components are folded without touching the filesystem.
//!
//! # Confinement
//!
//! [`BaseDirResolver::confined`] verifies that every resolved path remains
//! within the base directory, rejecting `../../etc/passwd` style escapes and
//! absolute paths elsewhere on disk.

use std::path::{Component, Path, PathBuf};
use trellis_traits::{PathError, PathResolver};

/// Folds `.` and `..` components without consulting the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root or a prefix.
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolves relative paths against the process working directory.
///
/// This is the builder's default collaborator.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkingDirResolver;

impl WorkingDirResolver {
    pub fn new() -> Self {
        Self
    }
}

impl PathResolver for WorkingDirResolver {
    fn resolve(&self, raw: &str, label: &str) -> Result<PathBuf, PathError> {
        let path = Path::new(raw);
        if path.is_absolute() {
            return Ok(normalize(path));
        }
        let cwd = std::env::current_dir().map_err(|e| PathError::Io {
            path: raw.to_string(),
            label: label.to_string(),
            message: e.to_string(),
        })?;
        Ok(normalize(&cwd.join(path)))
    }

    fn name(&self) -> &'static str {
        "WorkingDirResolver"
    }
}

/// Resolves relative paths against a caller-supplied base directory.
#[derive(Debug, Clone)]
pub struct BaseDirResolver {
    base: PathBuf,
    confined: bool,
}

impl BaseDirResolver {
    /// Creates a resolver rooted at `base`.
    ///
    /// Absolute attribute values are passed through unchanged.
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        Self {
            base: normalize(base.as_ref()),
            confined: false,
        }
    }

    /// Creates a resolver that refuses any path outside `base`.
    pub fn confined<P: AsRef<Path>>(base: P) -> Self {
        Self {
            confined: true,
            ..Self::new(base)
        }
    }

    /// Returns the base directory for this resolver.
    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn is_confined(&self) -> bool {
        self.confined
    }
}

impl PathResolver for BaseDirResolver {
    fn resolve(&self, raw: &str, label: &str) -> Result<PathBuf, PathError> {
        let resolved = normalize(&self.base.join(raw));

        if self.confined && !resolved.starts_with(&self.base) {
            log::debug!(
                "Rejected path '{}' for {}: outside {}",
                raw,
                label,
                self.base.display()
            );
            return Err(PathError::Escapes {
                path: raw.to_string(),
                label: label.to_string(),
            });
        }
        Ok(resolved)
    }

    fn name(&self) -> &'static str {
        "BaseDirResolver"
    }
}
