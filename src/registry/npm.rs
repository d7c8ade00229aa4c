//! npm Registry client
//!
//! Lists every version ever published for a package.
//! API endpoint: {registry}/{package}

use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryClient};
use async_trait::async_trait;
use semver::Version;
use serde::Deserialize;
use std::collections::HashMap;

/// Public npm registry
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// npm registry client
pub struct NpmRegistry {
    client: HttpClient,
    base_url: String,
}

/// npm package document (only the parts we read)
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    /// Published versions keyed by version string
    #[serde(default)]
    versions: HashMap<String, serde_json::Value>,
}

impl NpmRegistry {
    /// Create a client for the registry at `base_url`
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for a package. Scoped names keep their `@scope/` prefix
    /// with the slash encoded, which every npm-compatible registry accepts.
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}", self.base_url, package.replacen('/', "%2f", 1))
    }
}

#[async_trait]
impl RegistryClient for NpmRegistry {
    fn registry_name(&self) -> &str {
        "npm"
    }

    async fn published_versions(&self, package: &str) -> Result<Vec<Version>, RegistryError> {
        let url = self.build_url(package);
        let response: NpmPackageResponse = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        Ok(parse_versions(response.versions.keys()))
    }
}

/// Parse version strings, skipping anything that is not valid semver, sorted ascending
fn parse_versions<'a>(raw: impl Iterator<Item = &'a String>) -> Vec<Version> {
    let mut versions: Vec<Version> = raw.filter_map(|v| Version::parse(v).ok()).collect();
    versions.sort();
    versions
}
