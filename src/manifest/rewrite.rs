//! Rewriting manifests to the release version

use crate::error::ManifestError;
use crate::manifest::ManifestStore;
use serde_json::{Map, Value};
use std::path::Path;

/// Constraint meaning "the local workspace copy of this package"
pub const WORKSPACE_SENTINEL: &str = "workspace:*";

/// Dependency tables whose workspace links are pinned at release time
pub const DEPENDENCY_FIELDS: [&str; 2] = ["dependencies", "devDependencies"];

/// Whether a dependency constraint is the workspace sentinel
pub fn is_workspace_sentinel(constraint: &str) -> bool {
    constraint.trim().eq_ignore_ascii_case(WORKSPACE_SENTINEL)
}

/// Set `version` and pin every `workspace:*` dependency to `version`.
///
/// Returns the number of dependency constraints that were rewritten.
pub fn apply_release_version(manifest: &mut Map<String, Value>, version: &str) -> usize {
    manifest.insert("version".to_string(), Value::String(version.to_string()));

    let mut rewritten = 0;
    for field in DEPENDENCY_FIELDS {
        let Some(deps) = manifest.get_mut(field).and_then(Value::as_object_mut) else {
            continue;
        };
        for constraint in deps.values_mut() {
            if constraint.as_str().is_some_and(is_workspace_sentinel) {
                *constraint = Value::String(version.to_string());
                rewritten += 1;
            }
        }
    }
    rewritten
}

/// Rewrite manifest text to the release version, returning the new pretty-printed text
pub fn rewrite_manifest_content(
    path: &Path,
    content: &str,
    version: &str,
) -> Result<String, ManifestError> {
    let mut manifest = ManifestStore::parse(path, content)?;
    apply_release_version(&mut manifest, version);
    ManifestStore::to_pretty(&manifest)
}
