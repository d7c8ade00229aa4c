//! Release configuration
//!
//! Settings are merged from (in priority order):
//! - command line flags
//! - monorel.toml in the workspace root (or the file given with --config)
//! - .npmrc (`registry=` only)
//! - built-in defaults
//!
//! `--publish` is only ever taken from the command line.

use crate::cli::CliArgs;
use crate::domain::{ReleaseRequest, DEFAULT_GIT_TAG_TEMPLATE};
use crate::error::{ConfigError, ReleaseError};
use crate::registry::DEFAULT_REGISTRY_URL;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the workspace root
pub const CONFIG_FILE: &str = "monorel.toml";

/// Contents of monorel.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSettings {
    /// Default dist-tag
    pub npm_tag: Option<String>,
    /// Git tag template
    pub git_tag: Option<String>,
    /// Push the tag after a real publish
    pub push_tag: Option<bool>,
    /// Package filters used when none are given on the command line
    #[serde(default)]
    pub filter: Vec<String>,
    /// Registry queried for published versions
    pub registry: Option<String>,
}

/// Settings read from files in the workspace
#[derive(Debug, Clone, Default)]
pub struct ReleaseSettings {
    /// monorel.toml contents (default when absent)
    pub file: FileSettings,
    /// `registry=` from .npmrc
    pub npmrc_registry: Option<String>,
}

impl ReleaseSettings {
    /// Read settings for the workspace at `dir`.
    ///
    /// An explicit config path must exist; the default monorel.toml is optional.
    pub fn load(dir: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                read_file_settings(path)?
            }
            None => {
                let path = dir.join(CONFIG_FILE);
                if path.exists() {
                    read_file_settings(&path)?
                } else {
                    FileSettings::default()
                }
            }
        };

        Ok(Self {
            file,
            npmrc_registry: read_npmrc_registry(dir),
        })
    }
}

/// Parse monorel.toml content. `path` is only used for error context.
pub fn parse_file_settings(path: &Path, content: &str) -> Result<FileSettings, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read_file_settings(path: &Path) -> Result<FileSettings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    parse_file_settings(path, &content)
}

/// Read `registry=` from .npmrc
fn read_npmrc_registry(dir: &Path) -> Option<String> {
    let content = std::fs::read_to_string(dir.join(".npmrc")).ok()?;

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            if key.trim() == "registry" {
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }

    None
}

/// Absolute, canonical workspace root
pub fn resolve_working_dir(dir: &Path) -> Result<PathBuf, ConfigError> {
    dir.canonicalize().map_err(|e| ConfigError::InvalidPath {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })
}

/// Fully merged configuration of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// The release request
    pub request: ReleaseRequest,
    /// Registry queried for published versions
    pub registry_url: String,
}

impl ResolvedConfig {
    /// Merge CLI arguments over file settings
    pub fn from_sources(
        args: &CliArgs,
        settings: &ReleaseSettings,
        working_dir: PathBuf,
    ) -> Result<Self, ReleaseError> {
        let file = &settings.file;

        let dist_tag = args
            .npm_tag
            .clone()
            .or_else(|| file.npm_tag.clone())
            .filter(|tag| !tag.trim().is_empty())
            .ok_or_else(|| ReleaseError::missing_argument("npm-tag"))?;

        let filters = if args.filter.is_empty() {
            file.filter.clone()
        } else {
            args.filter.clone()
        };

        let git_tag_template = args
            .git_tag
            .clone()
            .or_else(|| file.git_tag.clone())
            .unwrap_or_else(|| DEFAULT_GIT_TAG_TEMPLATE.to_string());

        let mut request = ReleaseRequest::new(dist_tag, working_dir)
            .with_filters(filters)
            .with_publish(args.publish)
            .with_push_tag(args.push_tag || file.push_tag.unwrap_or(false))
            .with_git_tag_template(git_tag_template);
        if let Some(version) = args.version.as_deref().filter(|v| !v.trim().is_empty()) {
            request = request.with_version(version);
        }

        let registry_url = args
            .registry
            .clone()
            .or_else(|| file.registry.clone())
            .or_else(|| settings.npmrc_registry.clone())
            .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string());

        Ok(Self {
            request,
            registry_url,
        })
    }
}
