//! Release request and resolved version

use std::fmt;
use std::path::PathBuf;

/// Git tag template used when none is configured
pub const DEFAULT_GIT_TAG_TEMPLATE: &str = "v{version}";

/// Everything a release run needs to know, fixed before the run starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    /// Version expression, possibly containing `{rev}` / `{time}`.
    /// `None` asks for an interactive suggestion.
    pub version_expression: Option<String>,
    /// Registry dist-tag to publish under
    pub dist_tag: String,
    /// pnpm `--filter` expressions; empty means every package
    pub filters: Vec<String>,
    /// Real publish; `false` is a dry run
    pub publish: bool,
    /// Push the git tag to `origin`
    pub push_tag: bool,
    /// Git tag template with a `{version}` placeholder
    pub git_tag_template: String,
    /// Workspace root
    pub working_dir: PathBuf,
}

impl ReleaseRequest {
    /// Create a dry-run request for `dist_tag` rooted at `working_dir`
    pub fn new(dist_tag: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            version_expression: None,
            dist_tag: dist_tag.into(),
            filters: Vec::new(),
            publish: false,
            push_tag: false,
            git_tag_template: DEFAULT_GIT_TAG_TEMPLATE.to_string(),
            working_dir: working_dir.into(),
        }
    }

    /// Set the version expression
    pub fn with_version(mut self, expression: impl Into<String>) -> Self {
        self.version_expression = Some(expression.into());
        self
    }

    /// Set the package filters
    pub fn with_filters(mut self, filters: Vec<String>) -> Self {
        self.filters = filters;
        self
    }

    /// Enable or disable the real publish
    pub fn with_publish(mut self, publish: bool) -> Self {
        self.publish = publish;
        self
    }

    /// Enable or disable pushing the tag
    pub fn with_push_tag(mut self, push_tag: bool) -> Self {
        self.push_tag = push_tag;
        self
    }

    /// Set the git tag template
    pub fn with_git_tag_template(mut self, template: impl Into<String>) -> Self {
        self.git_tag_template = template.into();
        self
    }

    /// Whether this is a dry run
    pub fn is_dry_run(&self) -> bool {
        !self.publish
    }
}

/// Concrete version string used for every manifest in a run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedVersion(String);

impl ResolvedVersion {
    /// Wrap a concrete version
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// The version string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResolvedVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
