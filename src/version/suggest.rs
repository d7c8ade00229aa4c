//! Next-version suggestions
//!
//! Suggestions are derived from every version already published for the
//! workspace packages, restricted to the release channel:
//! - Stable: patch bump of the greatest stable version
//! - Canary: pre-release bump of the greatest canary version, plus a
//!   timestamped `{base}-{marker}.{rev}.{time}` template

use crate::domain::Channel;
use crate::error::ReleaseError;
use semver::{BuildMetadata, Prerelease, Version};

/// A proposed version (possibly still containing placeholders)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSuggestion {
    /// Short description shown next to the version
    pub label: String,
    /// Version or version template
    pub version: String,
}

impl VersionSuggestion {
    /// Create a new suggestion
    pub fn new(label: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            version: version.into(),
        }
    }
}

/// Greatest published version that belongs to `channel`
pub fn greatest_in_channel(versions: &[Version], channel: Channel) -> Option<&Version> {
    versions.iter().filter(|v| channel.accepts(v)).max()
}

/// Next patch release, dropping any pre-release or build metadata
pub fn bump_patch(version: &Version) -> Result<Version, ReleaseError> {
    let patch = version
        .patch
        .checked_add(1)
        .ok_or_else(|| invalid_version(version.to_string(), "patch number out of range"))?;
    Ok(Version::new(version.major, version.minor, patch))
}

/// The release a version leads to: itself for a pre-release, the next patch otherwise
pub fn next_release_base(version: &Version) -> Result<Version, ReleaseError> {
    if version.pre.is_empty() {
        bump_patch(version)
    } else {
        Ok(Version::new(version.major, version.minor, version.patch))
    }
}

/// Increment the pre-release part of `version`.
///
/// The last numeric identifier is incremented (`canary.4` -> `canary.5`); a
/// pre-release without one gets `.0` appended. A stable version moves to the
/// next patch with `<marker>.0`.
pub fn bump_prerelease(version: &Version, marker: &str) -> Result<Version, ReleaseError> {
    if version.pre.is_empty() {
        let mut next = bump_patch(version)?;
        next.pre = parse_prerelease(&format!("{}.0", marker))?;
        return Ok(next);
    }

    let mut identifiers: Vec<String> = version.pre.as_str().split('.').map(String::from).collect();
    match identifiers
        .iter()
        .rposition(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
    {
        Some(index) => {
            let next = identifiers[index]
                .parse::<u64>()
                .ok()
                .and_then(|current| current.checked_add(1))
                .ok_or_else(|| {
                    invalid_version(version.to_string(), "pre-release number out of range")
                })?;
            identifiers[index] = next.to_string();
        }
        None => identifiers.push("0".to_string()),
    }

    let mut next = version.clone();
    next.pre = parse_prerelease(&identifiers.join("."))?;
    next.build = BuildMetadata::EMPTY;
    Ok(next)
}

/// Build the suggestions offered for a release.
///
/// `marker` is the pre-release marker (the dist-tag), `current` the committed
/// root version used when nothing has been published yet.
pub fn suggest_versions(
    published: &[Version],
    channel: Channel,
    marker: &str,
    current: Option<&Version>,
) -> Result<Vec<VersionSuggestion>, ReleaseError> {
    if let Some(latest) = greatest_in_channel(published, channel) {
        return match channel {
            Channel::Stable => Ok(vec![VersionSuggestion::new(
                format!("patch bump of {}", latest),
                bump_patch(latest)?.to_string(),
            )]),
            Channel::Canary => Ok(vec![
                VersionSuggestion::new(
                    format!("prerelease bump of {}", latest),
                    bump_prerelease(latest, marker)?.to_string(),
                ),
                timestamped(&next_release_base(latest)?, marker),
            ]),
        };
    }

    let base = match published.iter().max() {
        Some(latest) => next_release_base(latest)?,
        None => match current {
            Some(version) => Version::new(version.major, version.minor, version.patch),
            None => return Ok(Vec::new()),
        },
    };

    let suggestions = match channel {
        Channel::Stable => vec![VersionSuggestion::new("first stable", base.to_string())],
        Channel::Canary => {
            let mut first = base.clone();
            first.pre = parse_prerelease(&format!("{}.0", marker))?;
            vec![
                VersionSuggestion::new(format!("first {}", marker), first.to_string()),
                timestamped(&base, marker),
            ]
        }
    };
    Ok(suggestions)
}

fn timestamped(base: &Version, marker: &str) -> VersionSuggestion {
    VersionSuggestion::new(
        "timestamped build",
        format!("{}-{}.{{rev}}.{{time}}", base, marker),
    )
}

fn parse_prerelease(text: &str) -> Result<Prerelease, ReleaseError> {
    Prerelease::new(text).map_err(|e| invalid_version(text, e.to_string()))
}

fn invalid_version(version: impl Into<String>, message: impl Into<String>) -> ReleaseError {
    ReleaseError::InvalidVersion {
        version: version.into(),
        message: message.into(),
    }
}
