//! CLI argument parsing module for monorel

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Release every package of a pnpm workspace under one version
#[derive(Parser, Debug, Clone)]
#[command(
    name = "monorel",
    about = "Version, publish and tag every package of a pnpm workspace",
    disable_version_flag = true
)]
pub struct CliArgs {
    /// Version to release. May contain {rev} (commit count) and {time} (UTC timestamp).
    /// Omit to pick from suggested versions interactively
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Registry dist-tag to publish under (e.g. latest, canary)
    #[arg(long = "npm-tag", value_name = "TAG")]
    pub npm_tag: Option<String>,

    /// pnpm package filter (can be specified multiple times)
    #[arg(long, action = ArgAction::Append, value_name = "FILTER")]
    pub filter: Vec<String>,

    /// Publish for real. Without it the release is a dry run
    #[arg(long)]
    pub publish: bool,

    /// Push the release tag to origin
    #[arg(long = "push-tag")]
    pub push_tag: bool,

    /// Git tag template (default: v{version})
    #[arg(long = "git-tag", value_name = "TEMPLATE")]
    pub git_tag: Option<String>,

    /// Workspace root (default: current directory)
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Print full error details and debug output
    #[arg(long)]
    pub verbose: bool,

    /// Registry queried for published versions
    #[arg(long, value_name = "URL")]
    pub registry: Option<String>,

    /// Config file (default: monorel.toml in the workspace root, if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
