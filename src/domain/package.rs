//! Workspace package descriptor

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Manifest file name inside every package directory
pub const MANIFEST_FILE: &str = "package.json";

/// A package as reported by the workspace listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageInfo {
    /// Package name (absent for unnamed workspace roots)
    #[serde(default)]
    pub name: Option<String>,
    /// Version in the committed manifest
    #[serde(default)]
    pub version: Option<String>,
    /// Package directory
    pub path: PathBuf,
    /// Private packages are never published
    #[serde(default)]
    pub private: bool,
}

impl PackageInfo {
    /// Create a new package descriptor
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            version: Some(version.into()),
            path: path.into(),
            private: false,
        }
    }

    /// Mark the package private
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Path of the package's package.json
    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(MANIFEST_FILE)
    }

    /// Name to show in logs
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| dir_name(&self.path))
    }

    /// Whether the registry can hold published versions of this package
    pub fn is_publishable(&self) -> bool {
        !self.private && self.name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

fn dir_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<root>")
}
