//! Workspace package discovery
//!
//! Packages are listed with `pnpm m ls --json`. The listing is cached for the
//! lifetime of the inspector, which is created once per release run.

use crate::command::CommandRunner;
use crate::domain::PackageInfo;
use crate::error::ReleaseError;
use std::cell::OnceCell;
use std::path::PathBuf;

/// Command listing every workspace package as JSON
pub const LIST_PACKAGES_COMMAND: &str = "pnpm m ls --json";

/// Lists the packages of a workspace
pub trait WorkspaceInspector {
    /// Packages in discovery order
    fn list_packages(&self) -> Result<Vec<PackageInfo>, ReleaseError>;
}

/// pnpm workspace inspector with a per-run cache
pub struct PnpmWorkspace<'a> {
    runner: &'a dyn CommandRunner,
    root: PathBuf,
    cache: OnceCell<Vec<PackageInfo>>,
}

impl<'a> PnpmWorkspace<'a> {
    /// Create an inspector for the workspace at `root`
    pub fn new(runner: &'a dyn CommandRunner, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            root: root.into(),
            cache: OnceCell::new(),
        }
    }

    fn load(&self) -> Result<Vec<PackageInfo>, ReleaseError> {
        let output = self.runner.output_of(LIST_PACKAGES_COMMAND)?;
        let mut packages: Vec<PackageInfo> = serde_json::from_str(&output)
            .map_err(|e| ReleaseError::unexpected_output(LIST_PACKAGES_COMMAND, e.to_string()))?;

        for package in &mut packages {
            if package.path.is_relative() {
                package.path = self.root.join(&package.path);
            }
        }
        Ok(packages)
    }
}

impl WorkspaceInspector for PnpmWorkspace<'_> {
    fn list_packages(&self) -> Result<Vec<PackageInfo>, ReleaseError> {
        if let Some(packages) = self.cache.get() {
            return Ok(packages.clone());
        }
        let packages = self.load()?;
        Ok(self.cache.get_or_init(|| packages).clone())
    }
}
