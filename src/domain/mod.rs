//! Core domain models for monorel
//!
//! This module contains the fundamental types used throughout the application:
//! - The immutable release request built from CLI and config
//! - The concrete version computed once per run
//! - Workspace package descriptors
//! - Release channels (stable vs canary)

mod channel;
mod package;
mod release;

pub use channel::Channel;
pub use package::{PackageInfo, MANIFEST_FILE};
pub use release::{ReleaseRequest, ResolvedVersion, DEFAULT_GIT_TAG_TEMPLATE};
