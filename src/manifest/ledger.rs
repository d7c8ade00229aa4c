//! Rollback ledger for temporarily mutated files
//!
//! Every file touched during a release is registered here with its original
//! content before the new content is written. `restore` writes every original
//! back. Dropping a ledger that still holds entries restores them too, so an
//! early return or a panic between the rewrite and the explicit restore does
//! not leave release versions in the working tree.

use crate::error::{ManifestError, ReleaseError};
use crate::log::Logger;
use crate::manifest::ManifestStore;
use std::path::{Path, PathBuf};

/// Original content of one mutated file
#[derive(Debug, Clone)]
struct LedgerEntry {
    path: PathBuf,
    original: String,
}

/// A file that could not be written back
#[derive(Debug)]
pub struct RestoreFailure {
    /// File that is still mutated
    pub path: PathBuf,
    /// Why the write failed
    pub error: ManifestError,
}

/// Per-run record of file path -> original content
#[derive(Debug)]
pub struct RollbackLedger {
    entries: Vec<LedgerEntry>,
    logger: Logger,
}

impl RollbackLedger {
    /// Create an empty ledger
    pub fn new(logger: Logger) -> Self {
        Self {
            entries: Vec::new(),
            logger,
        }
    }

    /// Number of registered files
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `path` has already been registered
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }

    /// Record the original content of `path`.
    ///
    /// A path may be registered at most once per run.
    pub fn register(
        &mut self,
        path: impl Into<PathBuf>,
        original: impl Into<String>,
    ) -> Result<(), ReleaseError> {
        let path = path.into();
        if self.contains(&path) {
            return Err(ReleaseError::duplicate_update(path));
        }
        self.entries.push(LedgerEntry {
            path,
            original: original.into(),
        });
        Ok(())
    }

    /// Rewrite `path` through `update`, recording its original content first.
    ///
    /// The new content is computed before anything is registered, so a failing
    /// `update` leaves both the file and the ledger untouched.
    pub fn update_file<F>(&mut self, path: &Path, update: F) -> Result<(), ReleaseError>
    where
        F: FnOnce(&str) -> Result<String, ManifestError>,
    {
        if self.contains(path) {
            return Err(ReleaseError::duplicate_update(path));
        }
        self.logger.debug(format!(
            "Updating file {}. The file will be rolled back after the release",
            path.display()
        ));

        let current = ManifestStore::read_raw(path)?;
        self.logger
            .debug(format!("Current content of {} is {}", path.display(), current));
        let updated = update(&current)?;

        self.register(path, current)?;
        ManifestStore::write_raw(path, &updated)?;
        Ok(())
    }

    /// Write every original content back, in registration order.
    ///
    /// The ledger is drained; restoring twice is a no-op the second time.
    /// Failures are returned, not raised, so every file gets its attempt.
    pub fn restore(&mut self) -> Vec<RestoreFailure> {
        let entries = std::mem::take(&mut self.entries);
        let mut failures = Vec::new();

        for entry in entries {
            self.logger.debug(format!(
                "Rolling back {}. Content: {}",
                entry.path.display(),
                entry.original
            ));
            if let Err(error) = ManifestStore::write_raw(&entry.path, &entry.original) {
                failures.push(RestoreFailure {
                    path: entry.path,
                    error,
                });
            }
        }
        failures
    }
}

impl Drop for RollbackLedger {
    fn drop(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        for failure in self.restore() {
            self.logger.error(format!(
                "Failed to roll back {}: {}",
                failure.path.display(),
                failure.error
            ));
        }
    }
}
