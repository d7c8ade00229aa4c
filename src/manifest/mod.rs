//! package.json handling for releases
//!
//! This module provides functionality to:
//! - Read and write package.json files as JSON objects
//! - Rewrite a manifest to the release version, including `workspace:*` dependencies
//! - Record original contents and restore them after the release

mod ledger;
mod rewrite;
mod store;

pub use ledger::{RestoreFailure, RollbackLedger};
pub use rewrite::{
    apply_release_version, is_workspace_sentinel, rewrite_manifest_content, DEPENDENCY_FIELDS,
    WORKSPACE_SENTINEL,
};
pub use store::ManifestStore;
