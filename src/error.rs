//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ReleaseError: everything a release run can fail with
//! - ManifestError: Issues reading or writing package.json files
//! - CommandError: Non-zero exits and spawn failures of shell commands
//! - RegistryError: Issues with package registry communication
//! - ConfigError: Issues with monorel.toml / CLI configuration

use std::path::PathBuf;
use thiserror::Error;

/// Error returned by a release run
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// A required tool is not installed or not on PATH
    #[error("{tool} is not available. Make sure it is installed and on PATH")]
    MissingToolchain { tool: String },

    /// A package.json could not be found
    #[error("can't find package.json at {}", path.display())]
    ManifestNotFound { path: PathBuf },

    /// No version was given and none could be chosen
    #[error("--version command line argument is required")]
    VersionRequired,

    /// A required argument was given neither on the command line nor in monorel.toml
    #[error("--{name} command line argument is required")]
    MissingArgument { name: String },

    /// The git tag for this version already exists
    #[error(
        "tag {tag} already exists. Seems like version {version} has already been released. \
         If you believe this is an error, please run `git tag -d {tag}`"
    )]
    TagAlreadyExists { tag: String, version: String },

    /// A real publish was requested without registry credentials
    #[error(
        "can't find npm auth - make sure you're authorized with `pnpm login` before running with --publish"
    )]
    NotAuthorized,

    /// The same file was registered for rollback twice
    #[error("file {} is already updated", path.display())]
    DuplicateUpdate { path: PathBuf },

    /// `pnpm publish` exited with a non-zero status
    #[error("publish failed: `{command}` exited with status {status}")]
    PublishFailed {
        command: String,
        status: i32,
        stdout: String,
        stderr: String,
    },

    /// Creating or pushing the git tag failed
    #[error("tagging failed: {message}")]
    TaggingFailed { command: String, message: String },

    /// The computed version is not a valid semantic version
    #[error("invalid version '{version}': {message}")]
    InvalidVersion { version: String, message: String },

    /// A command succeeded but its output could not be interpreted
    #[error("can't parse output of `{command}`: {message}")]
    UnexpectedOutput { command: String, message: String },

    /// Generic non-zero exit from a shell command
    #[error(transparent)]
    CommandFailed(#[from] CommandError),

    /// Manifest errors other than a missing file
    #[error(transparent)]
    Manifest(ManifestError),

    /// Package registry related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<ManifestError> for ReleaseError {
    fn from(err: ManifestError) -> Self {
        match err {
            ManifestError::NotFound { path } => ReleaseError::ManifestNotFound { path },
            other => ReleaseError::Manifest(other),
        }
    }
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write manifest file
    #[error("failed to write manifest file {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("failed to parse JSON in {}: {message}", path.display())]
    JsonParseError { path: PathBuf, message: String },

    /// The manifest is valid JSON but not an object
    #[error("{} is not a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    /// A manifest could not be rendered as JSON
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A required field is absent
    #[error("can't find field '{field}' in {}", path.display())]
    MissingField { path: PathBuf, field: String },
}

/// Errors raised by the command runner
#[derive(Error, Debug)]
pub enum CommandError {
    /// The command ran and exited with a non-zero status
    #[error("{message}")]
    Failed {
        command: String,
        status: i32,
        stdout: String,
        stderr: String,
        message: String,
    },

    /// The shell could not be started
    #[error("failed to execute `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to package registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {registry} registry")]
    RateLimitExceeded { registry: String },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicitly requested config file is missing
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Config file could not be read
    #[error("failed to read config file {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the expected schema
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Invalid working directory
    #[error("invalid path '{}': {message}", path.display())]
    InvalidPath { path: PathBuf, message: String },
}

impl ReleaseError {
    /// Creates a new MissingToolchain error
    pub fn missing_toolchain(tool: impl Into<String>) -> Self {
        ReleaseError::MissingToolchain { tool: tool.into() }
    }

    /// Creates a new MissingArgument error
    pub fn missing_argument(name: impl Into<String>) -> Self {
        ReleaseError::MissingArgument { name: name.into() }
    }

    /// Creates a new TagAlreadyExists error
    pub fn tag_already_exists(tag: impl Into<String>, version: impl Into<String>) -> Self {
        ReleaseError::TagAlreadyExists {
            tag: tag.into(),
            version: version.into(),
        }
    }

    /// Creates a new DuplicateUpdate error
    pub fn duplicate_update(path: impl Into<PathBuf>) -> Self {
        ReleaseError::DuplicateUpdate { path: path.into() }
    }

    /// Creates a new UnexpectedOutput error
    pub fn unexpected_output(command: impl Into<String>, message: impl Into<String>) -> Self {
        ReleaseError::UnexpectedOutput {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Converts a failed publish command into PublishFailed.
    /// Spawn failures stay generic command failures.
    pub fn publish_failed(err: CommandError) -> Self {
        match err {
            CommandError::Failed {
                command,
                status,
                stdout,
                stderr,
                ..
            } => ReleaseError::PublishFailed {
                command,
                status,
                stdout,
                stderr,
            },
            other => ReleaseError::CommandFailed(other),
        }
    }

    /// Converts a failed git tag/push command into TaggingFailed
    pub fn tagging_failed(err: CommandError) -> Self {
        ReleaseError::TaggingFailed {
            command: err.command().to_string(),
            message: err.to_string(),
        }
    }
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new MissingField error
    pub fn missing_field(path: impl Into<PathBuf>, field: impl Into<String>) -> Self {
        ManifestError::MissingField {
            path: path.into(),
            field: field.into(),
        }
    }
}

impl CommandError {
    /// The command line that failed
    pub fn command(&self) -> &str {
        match self {
            CommandError::Failed { command, .. } | CommandError::Spawn { command, .. } => command,
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }
}
