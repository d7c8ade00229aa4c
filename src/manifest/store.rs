//! Reading and writing package.json files

use crate::error::ManifestError;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// JSON manifest storage on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestStore;

impl ManifestStore {
    /// Read the raw text of a manifest
    pub fn read_raw(path: &Path) -> Result<String, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::not_found(path));
        }
        fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))
    }

    /// Read a manifest as a JSON object
    pub fn read(path: &Path) -> Result<Map<String, Value>, ManifestError> {
        let content = Self::read_raw(path)?;
        Self::parse(path, &content)
    }

    /// Parse manifest text as a JSON object. `path` is only used for error context.
    pub fn parse(path: &Path, content: &str) -> Result<Map<String, Value>, ManifestError> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| ManifestError::json_parse_error(path, e.to_string()))?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(ManifestError::NotAnObject {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Replace a manifest with pretty-printed JSON (2-space indent)
    pub fn write(path: &Path, manifest: &Map<String, Value>) -> Result<(), ManifestError> {
        Self::write_raw(path, &Self::to_pretty(manifest)?)
    }

    /// Replace a file's content verbatim
    pub fn write_raw(path: &Path, content: &str) -> Result<(), ManifestError> {
        fs::write(path, content).map_err(|e| ManifestError::write_error(path, e))
    }

    /// Render a manifest the way it is written to disk
    pub fn to_pretty(manifest: &Map<String, Value>) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(manifest).map_err(ManifestError::Serialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_missing_manifest() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = ManifestStore::read(&temp_dir.path().join("package.json")).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn test_read_invalid_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("package.json");
        fs::write(&path, "{ not json").unwrap();

        let err = ManifestStore::read(&path).unwrap_err();
        assert!(matches!(err, ManifestError::JsonParseError { .. }));
    }

    #[test]
    fn test_read_non_object() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("package.json");
        fs::write(&path, "[1, 2]").unwrap();

        let err = ManifestStore::read(&path).unwrap_err();
        assert!(matches!(err, ManifestError::NotAnObject { .. }));
    }

    #[test]
    fn test_write_is_pretty_with_two_spaces() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("package.json");
        let manifest = json!({"name": "a", "version": "1.0.0"});

        ManifestStore::write(&path, manifest.as_object().unwrap()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\n  \"name\": \"a\",\n  \"version\": \"1.0.0\"\n}");
    }

    #[test]
    fn test_key_order_is_preserved() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("package.json");
        fs::write(&path, r#"{"version":"1.0.0","name":"z","author":"a"}"#).unwrap();

        let manifest = ManifestStore::read(&path).unwrap();
        let keys: Vec<_> = manifest.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["version", "name", "author"]);
    }
}
