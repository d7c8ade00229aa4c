//! Release orchestrator for coordinating the entire release workflow
//!
//! This module provides:
//! - Workflow coordination: tooling → root manifest → version → tag check →
//!   auth → rewrite → publish → tag → rollback
//! - Dry-run mode support (`--dry-run` publish, no tag)
//! - Guaranteed rollback of every rewritten manifest, on success and failure

use crate::command::{shell_quote, CommandRunner, PrintMode, RunOptions};
use crate::domain::{Channel, PackageInfo, ReleaseRequest, ResolvedVersion, MANIFEST_FILE};
use crate::error::{ManifestError, ReleaseError, RegistryError};
use crate::git::Git;
use crate::log::Logger;
use crate::manifest::{rewrite_manifest_content, ManifestStore, RollbackLedger};
use crate::progress::Progress;
use crate::prompt::Prompter;
use crate::registry::RegistryClient;
use crate::version::{release_time, resolve_version, suggest_versions, Placeholders};
use crate::workspace::{PnpmWorkspace, WorkspaceInspector};
use chrono::{DateTime, Utc};
use semver::Version;
use std::path::{Path, PathBuf};

/// Tools that must answer `<tool> --version` before anything else runs
const REQUIRED_TOOLS: [&str; 2] = ["pnpm", "git"];

const WHOAMI_COMMAND: &str = "pnpm whoami";

const AUTH_HELP: &str = "make sure you're authorized with `pnpm login`";

/// Orchestrator for one release run
pub struct ReleaseOrchestrator {
    request: ReleaseRequest,
    runner: Box<dyn CommandRunner>,
    registry: Box<dyn RegistryClient>,
    prompter: Box<dyn Prompter>,
    logger: Logger,
    clock: fn() -> DateTime<Utc>,
    show_progress: bool,
}

/// What a finished run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    /// Version written to every manifest during the run
    pub version: ResolvedVersion,
    /// Rendered git tag
    pub git_tag: String,
    /// Whether the publish was real
    pub published: bool,
    /// Whether the tag was created
    pub tagged: bool,
    /// Whether the tag was pushed
    pub tag_pushed: bool,
    /// Manifests written back to their original content
    pub restored_files: usize,
}

impl ReleaseOrchestrator {
    /// Create an orchestrator for `request`
    pub fn new(
        request: ReleaseRequest,
        runner: Box<dyn CommandRunner>,
        registry: Box<dyn RegistryClient>,
        prompter: Box<dyn Prompter>,
        logger: Logger,
    ) -> Self {
        Self {
            request,
            runner,
            registry,
            prompter,
            logger,
            clock: Utc::now,
            show_progress: false,
        }
    }

    /// Use a fixed clock for `{time}` (for testing)
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Show a spinner while published versions are fetched
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run the release workflow
    pub async fn run(&self) -> Result<ReleaseOutcome, ReleaseError> {
        let runner = self.runner.as_ref();
        let git = Git::new(runner);
        let workspace = PnpmWorkspace::new(runner, &self.request.working_dir);

        // Step 1: tooling
        self.check_tooling()?;

        // Step 2: root manifest
        let root_manifest = normalize(&self.request.working_dir.join(MANIFEST_FILE));
        let current_version = read_current_version(&root_manifest)?;
        if self.request.filters.is_empty() {
            self.logger
                .info("No filter specified, running release for all packages");
        }

        // Step 3: version
        let version = self
            .resolve_release_version(&git, &workspace, &current_version)
            .await?;

        // Step 4: tag collision
        let git_tag = Placeholders::new()
            .value("version", version.as_str())
            .render(&self.request.git_tag_template)?;
        self.logger.info(format!(
            "Releasing version {} (current version {}). Git tag: {}",
            version, current_version, git_tag
        ));
        if git.tag_exists(&git_tag)? {
            return Err(ReleaseError::tag_already_exists(&git_tag, version.as_str()));
        }

        // Step 5: registry identity
        self.check_authorization()?;

        // Steps 6-8 mutate manifests; the ledger is drained on every path below
        let mut ledger = RollbackLedger::new(self.logger);
        let result = self.release(&workspace, &git, &mut ledger, &root_manifest, &version, &git_tag);

        // Step 9: rollback
        self.logger.info(format!(
            "Rolling back version in package.json(s) {} → {}",
            version, current_version
        ));
        let registered = ledger.len();
        let failures = ledger.restore();
        for failure in &failures {
            self.logger.error(format!(
                "Failed to restore {}: {}",
                failure.path.display(),
                failure.error
            ));
        }

        let (tagged, tag_pushed) = result?;
        Ok(ReleaseOutcome {
            version,
            git_tag,
            published: self.request.publish,
            tagged,
            tag_pushed,
            restored_files: registered - failures.len(),
        })
    }

    fn check_tooling(&self) -> Result<(), ReleaseError> {
        for tool in REQUIRED_TOOLS {
            let version = self
                .runner
                .output_or(&format!("{} --version", tool), "");
            if version.is_empty() {
                return Err(ReleaseError::missing_toolchain(tool));
            }
            self.logger.debug(format!("{} version: {}", tool, version));
        }
        Ok(())
    }

    async fn resolve_release_version(
        &self,
        git: &Git<'_>,
        workspace: &dyn WorkspaceInspector,
        current_version: &str,
    ) -> Result<ResolvedVersion, ReleaseError> {
        let expression = match &self.request.version_expression {
            Some(expression) => expression.clone(),
            None => self.choose_version(workspace, current_version).await?,
        };

        let now = (self.clock)();
        resolve_version(
            &expression,
            || git.revision_count().map(|count| count.to_string()),
            || Ok(release_time(now)),
        )
    }

    /// Suggest versions from the registry and let the prompter pick one
    async fn choose_version(
        &self,
        workspace: &dyn WorkspaceInspector,
        current_version: &str,
    ) -> Result<String, ReleaseError> {
        let packages = workspace.list_packages()?;
        let published = self.published_versions(&packages).await?;

        let channel = Channel::from_dist_tag(&self.request.dist_tag);
        let current = Version::parse(current_version).ok();
        let suggestions = suggest_versions(
            &published,
            channel,
            self.request.dist_tag.trim(),
            current.as_ref(),
        )?;
        self.logger.debug(format!(
            "{} {} version(s) published, {} suggestion(s) for channel {}",
            published.len(),
            self.registry.registry_name(),
            suggestions.len(),
            channel
        ));

        self.prompter
            .choose_version(&suggestions)
            .map(|answer| answer.trim().to_string())
            .filter(|answer| !answer.is_empty())
            .ok_or(ReleaseError::VersionRequired)
    }

    /// Every version published for the workspace packages, sorted
    async fn published_versions(
        &self,
        packages: &[PackageInfo],
    ) -> Result<Vec<Version>, ReleaseError> {
        let mut progress = Progress::new(self.show_progress);
        progress.spinner("Fetching published versions...");

        let mut versions = Vec::new();
        for package in packages.iter().filter(|p| p.is_publishable()) {
            let Some(name) = package.name.as_deref() else {
                continue;
            };
            progress.set_message(&format!("Fetching {}", name));

            match self.registry.published_versions(name).await {
                Ok(found) => versions.extend(found),
                Err(RegistryError::PackageNotFound { .. }) => {
                    self.logger
                        .debug(format!("{} has never been published", name));
                }
                Err(e) => return Err(e.into()),
            }
        }
        progress.finish_and_clear();

        versions.sort();
        versions.dedup();
        Ok(versions)
    }

    fn check_authorization(&self) -> Result<(), ReleaseError> {
        let user = self.runner.output_or(WHOAMI_COMMAND, "");
        if !user.is_empty() {
            self.logger
                .info(format!("NPM Registry - authorized as {}", user));
            return Ok(());
        }
        if self.request.publish {
            return Err(ReleaseError::NotAuthorized);
        }
        self.logger.warn(format!(
            "Not authorized. Continuing because this is a dry run. Before running with --publish {}",
            AUTH_HELP
        ));
        Ok(())
    }

    /// Steps 6-8. Returns (tagged, tag pushed).
    fn release(
        &self,
        workspace: &dyn WorkspaceInspector,
        git: &Git<'_>,
        ledger: &mut RollbackLedger,
        root_manifest: &Path,
        version: &ResolvedVersion,
        git_tag: &str,
    ) -> Result<(bool, bool), ReleaseError> {
        // Step 6: rewrite, sub-packages in discovery order, then the root
        for package in workspace.list_packages()? {
            let manifest = normalize(&package.manifest_path());
            self.rewrite(ledger, &manifest, version)?;
        }
        if !ledger.contains(root_manifest) {
            self.rewrite(ledger, root_manifest, version)?;
        }
        self.logger.debug(format!(
            "{} manifest(s) set to {}",
            ledger.len(),
            version
        ));

        // Step 7: publish
        if self.request.is_dry_run() {
            self.logger
                .info("Skipping publish, making a dry run. Add --publish to make a real release.");
        }
        self.runner
            .run(
                &publish_command(&self.request),
                &RunOptions::new(PrintMode::All),
            )
            .map_err(ReleaseError::publish_failed)?;

        // Step 8: tag
        let tag_command = Git::tag_command(git_tag, version.as_str());
        if self.request.is_dry_run() {
            let mut would_run = tag_command;
            if self.request.push_tag {
                would_run = format!("{} && {}", would_run, Git::push_command(git_tag));
            }
            self.logger.info(format!(
                "Because of dry run, not tagging the release. Here is the command that would tag it: `{}`",
                would_run
            ));
            return Ok((false, false));
        }

        git.create_tag(git_tag, version.as_str())?;
        if self.request.push_tag {
            git.push_tag(git_tag)?;
            return Ok((true, true));
        }
        Ok((true, false))
    }

    fn rewrite(
        &self,
        ledger: &mut RollbackLedger,
        manifest: &Path,
        version: &ResolvedVersion,
    ) -> Result<(), ReleaseError> {
        ledger.update_file(manifest, |content| {
            rewrite_manifest_content(manifest, content, version.as_str())
        })
    }
}

/// `pnpm publish` command line for a request
pub fn publish_command(request: &ReleaseRequest) -> String {
    let mut command = format!("pnpm publish -r --tag {}", request.dist_tag);
    for filter in &request.filters {
        command.push_str(" --filter ");
        command.push_str(&shell_quote(filter));
    }
    command.push_str(" --access public --force --no-git-checks");
    if request.is_dry_run() {
        command.push_str(" --dry-run");
    }
    command
}

/// `version` of the root manifest
fn read_current_version(root_manifest: &Path) -> Result<String, ReleaseError> {
    let manifest = ManifestStore::read(root_manifest)?;
    manifest
        .get("version")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| ManifestError::missing_field(root_manifest, "version").into())
}

/// Canonical form of a path that exists, the path itself otherwise
fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
