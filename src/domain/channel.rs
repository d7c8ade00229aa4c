//! Release channels

use semver::Version;
use std::fmt;

/// Dist-tag that maps to the stable channel
const STABLE_DIST_TAG: &str = "latest";

/// Distribution channel a release belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Plain `MAJOR.MINOR.PATCH` releases
    Stable,
    /// Pre-release builds carrying a pre-release marker
    Canary,
}

impl Channel {
    /// Derive the channel from a registry dist-tag.
    ///
    /// `latest` is stable, every other tag (`canary`, `next`, `beta`, ...) is a
    /// pre-release channel.
    pub fn from_dist_tag(tag: &str) -> Self {
        if tag.trim().eq_ignore_ascii_case(STABLE_DIST_TAG) {
            Channel::Stable
        } else {
            Channel::Canary
        }
    }

    /// Whether a published version belongs to this channel
    pub fn accepts(&self, version: &Version) -> bool {
        match self {
            Channel::Stable => version.pre.is_empty(),
            Channel::Canary => !version.pre.is_empty(),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Stable => write!(f, "stable"),
            Channel::Canary => write!(f, "canary"),
        }
    }
}
