//! Package registry access
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - npm registry client listing every published version of a package

mod client;
mod npm;

pub use client::HttpClient;
pub use npm::{NpmRegistry, DEFAULT_REGISTRY_URL};

use crate::error::RegistryError;
use async_trait::async_trait;
use semver::Version;

/// Source of already published versions
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Registry name used in messages
    fn registry_name(&self) -> &str;

    /// Every published version of `package`. Unparsable versions are skipped.
    async fn published_versions(&self, package: &str) -> Result<Vec<Version>, RegistryError>;
}
