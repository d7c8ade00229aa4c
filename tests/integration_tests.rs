//! Integration tests for the release workflow
//!
//! These tests verify:
//! - Manifests are rewritten for the publish and restored byte for byte
//! - Partial rewrites restore exactly the files that were touched
//! - Precondition failures (tag collision, auth, tooling) leave no trace
//! - Dry runs publish with `--dry-run` and never tag
//! - Suggested versions flow through the prompter and placeholder resolution

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use monorel::command::{CommandOutput, CommandRunner, RunOptions};
use monorel::domain::ReleaseRequest;
use monorel::error::{CommandError, RegistryError, ReleaseError};
use monorel::log::Logger;
use monorel::orchestrator::ReleaseOrchestrator;
use monorel::prompt::{NoPrompt, Prompter};
use monorel::registry::RegistryClient;
use monorel::version::VersionSuggestion;
use semver::Version;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const ROOT_MANIFEST: &str = "{\n    \"name\": \"acme-monorepo\",\n    \"version\": \"0.0.0\",\n    \"private\": true\n}\n";

const CORE_MANIFEST: &str = r#"{
  "name": "@acme/core",
  "version": "0.0.0",
  "dependencies": {
    "lodash": "^4.17.21"
  }
}
"#;

const CLI_MANIFEST: &str = r#"{"name":"@acme/cli","version":"0.0.0","dependencies":{"@acme/core":"workspace:*","chalk":"^5.0.0"},"devDependencies":{"@acme/testing":" Workspace:* "}}"#;

/// A temporary pnpm-style workspace with two packages
struct Workspace {
    _dir: TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("package.json"), ROOT_MANIFEST).unwrap();
        for (name, content) in [("core", CORE_MANIFEST), ("cli", CLI_MANIFEST)] {
            let package_dir = root.join("packages").join(name);
            fs::create_dir_all(&package_dir).unwrap();
            fs::write(package_dir.join("package.json"), content).unwrap();
        }
        Self { _dir: dir, root }
    }

    fn manifest(&self, package: &str) -> PathBuf {
        self.root.join("packages").join(package).join("package.json")
    }

    fn root_manifest(&self) -> PathBuf {
        self.root.join("package.json")
    }

    /// `pnpm m ls --json` output for the given package directories
    fn listing(&self, packages: &[&str]) -> String {
        let entries: Vec<serde_json::Value> = packages
            .iter()
            .map(|name| {
                serde_json::json!({
                    "name": format!("@acme/{}", name),
                    "version": "0.0.0",
                    "path": self.root.join("packages").join(name),
                    "private": false
                })
            })
            .collect();
        serde_json::to_string(&entries).unwrap()
    }

    fn snapshot(&self) -> Vec<(PathBuf, Vec<u8>)> {
        [
            self.root_manifest(),
            self.manifest("core"),
            self.manifest("cli"),
        ]
        .into_iter()
        .map(|path| {
            let bytes = fs::read(&path).unwrap();
            (path, bytes)
        })
        .collect()
    }
}

/// Command runner answering from a script of command prefixes
#[derive(Clone)]
struct ScriptedRunner {
    responses: Vec<(String, Result<String, i32>)>,
    calls: Arc<Mutex<Vec<String>>>,
    /// Manifest read while `pnpm publish` runs
    watched: Option<PathBuf>,
    /// Directory deleted while `pnpm publish` runs
    removed_at_publish: Option<PathBuf>,
    seen_at_publish: Arc<Mutex<Option<String>>>,
}

impl ScriptedRunner {
    /// A runner for an authorized user with every tool installed
    fn new(listing: String) -> Self {
        Self {
            responses: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            watched: None,
            removed_at_publish: None,
            seen_at_publish: Arc::new(Mutex::new(None)),
        }
        .respond("pnpm --version", Ok("9.1.0"))
        .respond("git --version", Ok("git version 2.44.0"))
        .respond("git rev-list --count HEAD", Ok("42"))
        .respond("git tag -l", Ok(""))
        .respond("pnpm whoami", Ok("acme-bot"))
        .respond("pnpm m ls --json", Ok(listing.as_str()))
        .respond("pnpm publish", Ok("+ @acme/core"))
        .respond("git tag -a", Ok(""))
        .respond("git push", Ok(""))
    }

    /// Answer commands starting with `prefix`. Later answers take precedence.
    fn respond(mut self, prefix: &str, answer: Result<&str, i32>) -> Self {
        self.responses
            .insert(0, (prefix.to_string(), answer.map(str::to_string)));
        self
    }

    fn watch(mut self, path: PathBuf) -> Self {
        self.watched = Some(path);
        self
    }

    fn remove_at_publish(mut self, dir: PathBuf) -> Self {
        self.removed_at_publish = Some(dir);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn ran(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &str, _: &RunOptions) -> Result<CommandOutput, CommandError> {
        self.calls.lock().unwrap().push(command.to_string());

        if command.starts_with("pnpm publish") {
            if let Some(path) = &self.watched {
                *self.seen_at_publish.lock().unwrap() = fs::read_to_string(path).ok();
            }
            if let Some(dir) = &self.removed_at_publish {
                fs::remove_dir_all(dir).unwrap();
            }
        }

        let answer = self
            .responses
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, answer)| answer.clone())
            .unwrap_or(Err(127));

        match answer {
            Ok(stdout) => Ok(CommandOutput::new(stdout, "")),
            Err(status) => Err(CommandError::Failed {
                command: command.to_string(),
                status,
                stdout: String::new(),
                stderr: "scripted failure".to_string(),
                message: format!("Command {} failed with status {}", command, status),
            }),
        }
    }
}

/// Registry with a fixed set of published versions
#[derive(Default)]
struct StaticRegistry {
    published: HashMap<String, Vec<Version>>,
}

impl StaticRegistry {
    fn with(mut self, package: &str, versions: &[&str]) -> Self {
        self.published.insert(
            package.to_string(),
            versions.iter().map(|v| Version::parse(v).unwrap()).collect(),
        );
        self
    }
}

#[async_trait]
impl RegistryClient for StaticRegistry {
    fn registry_name(&self) -> &str {
        "static"
    }

    async fn published_versions(&self, package: &str) -> Result<Vec<Version>, RegistryError> {
        self.published
            .get(package)
            .cloned()
            .ok_or_else(|| RegistryError::package_not_found(package, "static"))
    }
}

/// Prompter that records the suggestions and picks a fixed answer
struct ScriptedPrompter {
    answer: Option<String>,
    offered: Arc<Mutex<Vec<VersionSuggestion>>>,
}

impl Prompter for ScriptedPrompter {
    fn choose_version(&self, suggestions: &[VersionSuggestion]) -> Option<String> {
        *self.offered.lock().unwrap() = suggestions.to_vec();
        self.answer.clone()
    }
}

fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

fn orchestrator(
    request: ReleaseRequest,
    runner: &ScriptedRunner,
    registry: StaticRegistry,
    prompter: Box<dyn Prompter>,
) -> ReleaseOrchestrator {
    ReleaseOrchestrator::new(
        request,
        Box::new(runner.clone()),
        Box::new(registry),
        prompter,
        Logger::new(false),
    )
    .with_clock(fixed_clock)
}

fn request(workspace: &Workspace, version: &str) -> ReleaseRequest {
    ReleaseRequest::new("canary", &workspace.root).with_version(version)
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

mod rollback {
    use super::*;

    #[tokio::test]
    async fn test_successful_release_restores_every_byte() {
        let workspace = Workspace::new();
        let before = workspace.snapshot();
        let runner = ScriptedRunner::new(workspace.listing(&["core", "cli"]))
            .watch(workspace.manifest("cli"));

        let outcome = orchestrator(
            request(&workspace, "1.2.0-canary.{rev}.{time}").with_publish(true),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(outcome.version.as_str(), "1.2.0-canary.42.20240101120000");
        assert_eq!(outcome.git_tag, "v1.2.0-canary.42.20240101120000");
        assert!(outcome.published);
        assert!(outcome.tagged);
        assert!(!outcome.tag_pushed);
        assert_eq!(outcome.restored_files, 3);
        assert_eq!(workspace.snapshot(), before);
    }

    #[tokio::test]
    async fn test_manifests_carry_release_version_during_publish() {
        let workspace = Workspace::new();
        let runner = ScriptedRunner::new(workspace.listing(&["core", "cli"]))
            .watch(workspace.manifest("cli"));

        orchestrator(
            request(&workspace, "2.0.0"),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap();

        let during = runner.seen_at_publish.lock().unwrap().clone().unwrap();
        let manifest: serde_json::Value = serde_json::from_str(&during).unwrap();
        assert_eq!(manifest["version"], "2.0.0");
        assert_eq!(manifest["dependencies"]["@acme/core"], "2.0.0");
        assert_eq!(manifest["dependencies"]["chalk"], "^5.0.0");
        assert_eq!(manifest["devDependencies"]["@acme/testing"], "2.0.0");
        assert!(during.starts_with("{\n  \"name\""));

        assert_eq!(read_json(&workspace.manifest("cli"))["version"], "0.0.0");
    }

    #[tokio::test]
    async fn test_publish_failure_restores_and_surfaces_error() {
        let workspace = Workspace::new();
        let before = workspace.snapshot();
        let runner = ScriptedRunner::new(workspace.listing(&["core", "cli"]))
            .respond("pnpm publish", Err(1));

        let err = orchestrator(
            request(&workspace, "1.0.0").with_publish(true),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap_err();

        match err {
            ReleaseError::PublishFailed { status, stderr, .. } => {
                assert_eq!(status, 1);
                assert_eq!(stderr, "scripted failure");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(workspace.snapshot(), before);
        assert!(!runner.ran("git tag -a"));
    }

    #[tokio::test]
    async fn test_restore_failure_keeps_publish_error() {
        let workspace = Workspace::new();
        let root_before = fs::read(workspace.root_manifest()).unwrap();
        let cli_before = fs::read(workspace.manifest("cli")).unwrap();
        let core_dir = workspace.root.join("packages").join("core");
        let runner = ScriptedRunner::new(workspace.listing(&["core", "cli"]))
            .remove_at_publish(core_dir.clone())
            .respond("pnpm publish", Err(1));

        let err = orchestrator(
            request(&workspace, "1.0.0").with_publish(true),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, ReleaseError::PublishFailed { status: 1, .. }));
        assert!(!core_dir.exists());
        assert_eq!(fs::read(workspace.root_manifest()).unwrap(), root_before);
        assert_eq!(fs::read(workspace.manifest("cli")).unwrap(), cli_before);
    }

    #[tokio::test]
    async fn test_tagging_failure_restores() {
        let workspace = Workspace::new();
        let before = workspace.snapshot();
        let runner = ScriptedRunner::new(workspace.listing(&["core"]))
            .respond("git tag -a", Err(128));

        let err = orchestrator(
            request(&workspace, "1.0.0").with_publish(true),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, ReleaseError::TaggingFailed { .. }));
        assert_eq!(workspace.snapshot(), before);
    }

    #[tokio::test]
    async fn test_partial_rewrite_restores_touched_files_only() {
        let workspace = Workspace::new();
        let core_before = fs::read(workspace.manifest("core")).unwrap();
        let root_before = fs::read(workspace.root_manifest()).unwrap();
        // cli's manifest is broken: the run fails after core was rewritten
        fs::write(workspace.manifest("cli"), "{ not json").unwrap();
        let runner = ScriptedRunner::new(workspace.listing(&["core", "cli"]));

        let err = orchestrator(
            request(&workspace, "1.0.0"),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, ReleaseError::Manifest(_)));
        assert_eq!(fs::read(workspace.manifest("core")).unwrap(), core_before);
        assert_eq!(fs::read(workspace.root_manifest()).unwrap(), root_before);
        assert_eq!(
            fs::read_to_string(workspace.manifest("cli")).unwrap(),
            "{ not json"
        );
        assert!(!runner.ran("pnpm publish"));
    }

    #[tokio::test]
    async fn test_missing_package_manifest() {
        let workspace = Workspace::new();
        let before = workspace.snapshot();
        let runner = ScriptedRunner::new(workspace.listing(&["core", "ghost"]));

        let err = orchestrator(
            request(&workspace, "1.0.0"),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, ReleaseError::ManifestNotFound { .. }));
        assert_eq!(workspace.snapshot(), before);
    }

    #[tokio::test]
    async fn test_listed_root_is_rewritten_once() {
        let workspace = Workspace::new();
        let mut listing: Vec<serde_json::Value> =
            serde_json::from_str(&workspace.listing(&["core"])).unwrap();
        listing.insert(
            0,
            serde_json::json!({"name": "acme-monorepo", "version": "0.0.0", "path": workspace.root, "private": true}),
        );
        let runner = ScriptedRunner::new(serde_json::to_string(&listing).unwrap());

        let outcome = orchestrator(
            request(&workspace, "1.0.0"),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(outcome.restored_files, 2);
    }
}

mod preconditions {
    use super::*;

    #[tokio::test]
    async fn test_existing_tag_has_no_side_effects() {
        let workspace = Workspace::new();
        let before = workspace.snapshot();
        let runner = ScriptedRunner::new(workspace.listing(&["core", "cli"]))
            .respond("git tag -l", Ok("v1.0.0"));

        let err = orchestrator(
            request(&workspace, "1.0.0").with_publish(true),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap_err();

        match &err {
            ReleaseError::TagAlreadyExists { tag, version } => {
                assert_eq!(tag, "v1.0.0");
                assert_eq!(version, "1.0.0");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("git tag -d v1.0.0"));
        assert_eq!(workspace.snapshot(), before);
        assert!(!runner.ran("pnpm m ls"));
        assert!(!runner.ran("pnpm publish"));
    }

    #[tokio::test]
    async fn test_custom_tag_template() {
        let workspace = Workspace::new();
        let runner = ScriptedRunner::new(workspace.listing(&["core"]));

        let outcome = orchestrator(
            request(&workspace, "1.0.0")
                .with_git_tag_template("release-{version}")
                .with_publish(true)
                .with_push_tag(true),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(outcome.git_tag, "release-1.0.0");
        assert!(outcome.tag_pushed);
        let calls = runner.calls();
        assert!(calls.contains(&"git tag -l 'release-1.0.0'".to_string()));
        assert!(calls.contains(&"git tag -a 'release-1.0.0' -m 'Release 1.0.0'".to_string()));
        assert!(calls.contains(&"git push origin 'release-1.0.0'".to_string()));
    }

    #[tokio::test]
    async fn test_publish_without_auth_fails() {
        let workspace = Workspace::new();
        let before = workspace.snapshot();
        let runner =
            ScriptedRunner::new(workspace.listing(&["core"])).respond("pnpm whoami", Err(1));

        let err = orchestrator(
            request(&workspace, "1.0.0").with_publish(true),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, ReleaseError::NotAuthorized));
        assert_eq!(workspace.snapshot(), before);
    }

    #[tokio::test]
    async fn test_dry_run_without_auth_continues() {
        let workspace = Workspace::new();
        let runner =
            ScriptedRunner::new(workspace.listing(&["core"])).respond("pnpm whoami", Err(1));

        let outcome = orchestrator(
            request(&workspace, "1.0.0"),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap();

        assert!(!outcome.published);
        assert!(runner.ran("pnpm publish"));
    }

    #[tokio::test]
    async fn test_missing_toolchain() {
        let workspace = Workspace::new();
        let runner = ScriptedRunner::new(workspace.listing(&["core"])).respond("git --version", Ok(""));

        let err = orchestrator(
            request(&workspace, "1.0.0"),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap_err();

        match err {
            ReleaseError::MissingToolchain { tool } => assert_eq!(tool, "git"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_root_manifest() {
        let workspace = Workspace::new();
        fs::remove_file(workspace.root_manifest()).unwrap();
        let runner = ScriptedRunner::new(workspace.listing(&["core"]));

        let err = orchestrator(
            request(&workspace, "1.0.0"),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, ReleaseError::ManifestNotFound { .. }));
    }

    #[tokio::test]
    async fn test_invalid_version_expression() {
        let workspace = Workspace::new();
        let before = workspace.snapshot();
        let runner = ScriptedRunner::new(workspace.listing(&["core"]));

        let err = orchestrator(
            request(&workspace, "1.2"),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, ReleaseError::InvalidVersion { .. }));
        assert_eq!(workspace.snapshot(), before);
    }
}

mod dry_run {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_publishes_with_flag_and_never_tags() {
        let workspace = Workspace::new();
        let before = workspace.snapshot();
        let runner = ScriptedRunner::new(workspace.listing(&["core", "cli"]))
            .watch(workspace.manifest("core"));

        let outcome = orchestrator(
            request(&workspace, "1.0.0")
                .with_filters(vec!["@acme/core".to_string()])
                .with_push_tag(true),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap();

        assert!(!outcome.published);
        assert!(!outcome.tagged);
        assert!(!outcome.tag_pushed);
        assert!(runner.calls().contains(
            &"pnpm publish -r --tag canary --filter '@acme/core' --access public --force --no-git-checks --dry-run"
                .to_string()
        ));
        assert!(!runner.ran("git tag -a"));
        assert!(!runner.ran("git push"));

        let during = runner.seen_at_publish.lock().unwrap().clone().unwrap();
        assert!(during.contains("\"version\": \"1.0.0\""));
        assert_eq!(workspace.snapshot(), before);
    }
}

mod suggestions {
    use super::*;

    fn prompter(answer: Option<&str>) -> (Box<dyn Prompter>, Arc<Mutex<Vec<VersionSuggestion>>>) {
        let offered = Arc::new(Mutex::new(Vec::new()));
        let prompter = ScriptedPrompter {
            answer: answer.map(str::to_string),
            offered: Arc::clone(&offered),
        };
        (Box::new(prompter), offered)
    }

    #[tokio::test]
    async fn test_no_version_and_no_answer() {
        let workspace = Workspace::new();
        let runner = ScriptedRunner::new(workspace.listing(&["core"]));

        let err = orchestrator(
            ReleaseRequest::new("canary", &workspace.root),
            &runner,
            StaticRegistry::default(),
            Box::new(NoPrompt),
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, ReleaseError::VersionRequired));
        assert!(!runner.ran("pnpm publish"));
    }

    #[tokio::test]
    async fn test_canary_suggestions_from_published_versions() {
        let workspace = Workspace::new();
        let runner = ScriptedRunner::new(workspace.listing(&["core", "cli"]));
        let registry = StaticRegistry::default()
            .with("@acme/core", &["1.1.0", "1.2.0-canary.1", "1.2.0-canary.2"])
            .with("@acme/cli", &["1.1.0", "1.2.0-canary.4"]);
        let (prompter, offered) = prompter(Some("1.2.0-canary.{rev}.{time}"));

        let outcome = orchestrator(
            ReleaseRequest::new("canary", &workspace.root),
            &runner,
            registry,
            prompter,
        )
        .run()
        .await
        .unwrap();

        let offered: Vec<String> = offered
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.version.clone())
            .collect();
        assert_eq!(offered, vec!["1.2.0-canary.5", "1.2.0-canary.{rev}.{time}"]);
        assert_eq!(outcome.version.as_str(), "1.2.0-canary.42.20240101120000");
    }

    #[tokio::test]
    async fn test_stable_suggestion_ignores_prereleases() {
        let workspace = Workspace::new();
        let runner = ScriptedRunner::new(workspace.listing(&["core"]));
        let registry =
            StaticRegistry::default().with("@acme/core", &["1.9.0", "1.10.0", "1.11.0-canary.3"]);
        let (prompter, offered) = prompter(Some("1.10.1"));

        let outcome = orchestrator(
            ReleaseRequest::new("latest", &workspace.root),
            &runner,
            registry,
            prompter,
        )
        .run()
        .await
        .unwrap();

        assert_eq!(offered.lock().unwrap()[0].version, "1.10.1");
        assert_eq!(outcome.version.as_str(), "1.10.1");
        assert!(!runner.ran("git rev-list"));
    }

    #[tokio::test]
    async fn test_never_published_uses_root_version() {
        let workspace = Workspace::new();
        let runner = ScriptedRunner::new(workspace.listing(&["core"]));
        let (prompter, offered) = prompter(Some("0.0.0-canary.0"));

        orchestrator(
            ReleaseRequest::new("canary", &workspace.root),
            &runner,
            StaticRegistry::default(),
            prompter,
        )
        .run()
        .await
        .unwrap();

        assert_eq!(offered.lock().unwrap()[0].version, "0.0.0-canary.0");
    }
}
