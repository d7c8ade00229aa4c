//! Git operations used by a release
//!
//! All commands go through the `CommandRunner`, so they run in the project
//! root and are echoed like every other command.

use crate::command::{shell_quote, CommandRunner, PrintMode, RunOptions};
use crate::error::ReleaseError;

/// Remote release tags are pushed to
pub const DEFAULT_REMOTE: &str = "origin";

const REVISION_COUNT_COMMAND: &str = "git rev-list --count HEAD";

/// Git helper over a command runner
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Git<'a> {
    /// Create a helper that runs git through `runner`
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Number of commits reachable from HEAD
    pub fn revision_count(&self) -> Result<u64, ReleaseError> {
        let output = self.runner.output_of(REVISION_COUNT_COMMAND)?;
        output
            .parse()
            .map_err(|_| ReleaseError::unexpected_output(REVISION_COUNT_COMMAND, output))
    }

    /// Whether a tag with exactly this name exists
    pub fn tag_exists(&self, tag: &str) -> Result<bool, ReleaseError> {
        let output = self
            .runner
            .output_of(&format!("git tag -l {}", shell_quote(tag)))?;
        Ok(output.lines().any(|line| line.trim() == tag))
    }

    /// Command creating the annotated release tag
    pub fn tag_command(tag: &str, version: &str) -> String {
        format!(
            "git tag -a {} -m {}",
            shell_quote(tag),
            shell_quote(&format!("Release {}", version))
        )
    }

    /// Command pushing the release tag
    pub fn push_command(tag: &str) -> String {
        format!("git push {} {}", DEFAULT_REMOTE, shell_quote(tag))
    }

    /// Create the annotated release tag
    pub fn create_tag(&self, tag: &str, version: &str) -> Result<(), ReleaseError> {
        self.runner
            .run(&Self::tag_command(tag, version), &RunOptions::new(PrintMode::All))
            .map(|_| ())
            .map_err(ReleaseError::tagging_failed)
    }

    /// Push the release tag to the default remote
    pub fn push_tag(&self, tag: &str) -> Result<(), ReleaseError> {
        self.runner
            .run(&Self::push_command(tag), &RunOptions::new(PrintMode::All))
            .map(|_| ())
            .map_err(ReleaseError::tagging_failed)
    }
}
