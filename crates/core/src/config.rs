use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Session-wide settings for a [`Configurator`](crate::Configurator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfiguratorConfig {
    /// Reject macro templates that reference undeclared `${name}` attributes
    /// when the definition ends. (default: true)
    pub strict_placeholders: bool,
    /// Base directory for relative path attributes. When unset, paths are
    /// resolved against the working directory.
    pub base_dir: Option<PathBuf>,
    /// Refuse paths that leave `base_dir`. Ignored without a base directory.
    /// (default: false)
    pub confine_paths: bool,
}

impl Default for ConfiguratorConfig {
    fn default() -> Self {
        Self {
            strict_placeholders: true,
            base_dir: None,
            confine_paths: false,
        }
    }
}

impl ConfiguratorConfig {
    /// Resolve relative paths against `dir`.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
            ..Default::default()
        }
    }
}
