//! Placeholder templates
//!
//! Placeholders are written `{name}` and replaced by literal text match. Each
//! placeholder is backed by a producer that only runs when the placeholder
//! actually occurs in the template, so e.g. the git revision is never queried
//! for a plain `1.2.3`.

use crate::domain::ResolvedVersion;
use crate::error::ReleaseError;
use chrono::{DateTime, Utc};

/// Format of the `{time}` placeholder
const RELEASE_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

type Producer<'a> = Box<dyn Fn() -> Result<String, ReleaseError> + 'a>;

/// Named placeholder producers
#[derive(Default)]
pub struct Placeholders<'a> {
    producers: Vec<(String, Producer<'a>)>,
}

impl<'a> Placeholders<'a> {
    /// Create an empty placeholder set
    pub fn new() -> Self {
        Self {
            producers: Vec::new(),
        }
    }

    /// Add a placeholder with a fixed value
    pub fn value(self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        self.producer(name, move || Ok(value.clone()))
    }

    /// Add a placeholder computed on demand
    pub fn producer<F>(mut self, name: &str, producer: F) -> Self
    where
        F: Fn() -> Result<String, ReleaseError> + 'a,
    {
        self.producers
            .push((format!("{{{}}}", name), Box::new(producer)));
        self
    }

    /// Substitute every known placeholder in `template`.
    ///
    /// Unknown placeholders are left as they are.
    pub fn render(&self, template: &str) -> Result<String, ReleaseError> {
        let mut text = template.to_string();
        for (token, producer) in &self.producers {
            if text.contains(token.as_str()) {
                let value = producer()?;
                text = text.replace(token.as_str(), &value);
            }
        }
        Ok(text)
    }
}

/// Format a timestamp for the `{time}` placeholder (`YYYYMMDDHHMMSS`, UTC)
pub fn release_time(now: DateTime<Utc>) -> String {
    now.format(RELEASE_TIME_FORMAT).to_string()
}

/// Resolve a version expression into a concrete, semver-valid version.
///
/// `{rev}` and `{time}` are produced by the given closures, only when used.
pub fn resolve_version<R, T>(
    expression: &str,
    revision: R,
    time: T,
) -> Result<ResolvedVersion, ReleaseError>
where
    R: Fn() -> Result<String, ReleaseError>,
    T: Fn() -> Result<String, ReleaseError>,
{
    let rendered = Placeholders::new()
        .producer("rev", revision)
        .producer("time", time)
        .render(expression.trim())?;

    semver::Version::parse(&rendered).map_err(|e| ReleaseError::InvalidVersion {
        version: rendered.clone(),
        message: e.to_string(),
    })?;

    Ok(ResolvedVersion::new(rendered))
}
