//! monorel - pnpm workspace release library
//!
//! This library provides the release workflow for multi-package workspaces:
//! - Version resolution (explicit, templated or suggested from the registry)
//! - Temporary manifest rewrite with guaranteed rollback
//! - Publish, tag and push through the project's own tooling

pub mod cli;
pub mod command;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod log;
pub mod manifest;
pub mod orchestrator;
pub mod progress;
pub mod prompt;
pub mod registry;
pub mod version;
pub mod workspace;
