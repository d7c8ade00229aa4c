//! Release version computation
//!
//! This module provides:
//! - A placeholder template engine with lazily evaluated producers
//! - Resolution of `{rev}` / `{time}` version expressions
//! - Next-version suggestions from already published versions

mod suggest;
mod template;

pub use suggest::{
    bump_patch, bump_prerelease, greatest_in_channel, next_release_base, suggest_versions,
    VersionSuggestion,
};
pub use template::{release_time, resolve_version, Placeholders};
