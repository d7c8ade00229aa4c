//! Shell command execution in the project root
//!
//! This module provides:
//! - The `CommandRunner` trait consumed by the release workflow
//! - `ShellRunner`, which runs commands through the system shell
//! - Output echoing controlled by `PrintMode`
//! - Fallback execution for probes that are allowed to fail

use crate::error::CommandError;
use crate::log::{indent_output, Logger};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Prefix for echoed command output lines
const OUTPUT_PREFIX: &str = " > ";

/// Which captured output gets echoed to the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintMode {
    /// Echo stdout/stderr whether the command succeeds or fails
    #[default]
    All,
    /// Echo only when the command fails
    Error,
    /// Never echo
    Nothing,
}

impl PrintMode {
    fn echo_on_success(self) -> bool {
        self == PrintMode::All
    }

    fn echo_on_failure(self) -> bool {
        matches!(self, PrintMode::All | PrintMode::Error)
    }
}

/// Builds the error message for a failed command from the command line and exit status
pub type ErrorMessageFn = fn(&str, i32) -> String;

/// Options for a single command invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Output echo policy
    pub print: PrintMode,
    /// Custom failure message
    pub on_error_message: Option<ErrorMessageFn>,
}

impl RunOptions {
    /// Options with the given print mode
    pub fn new(print: PrintMode) -> Self {
        Self {
            print,
            on_error_message: None,
        }
    }

    /// Set a custom failure message builder
    pub fn with_error_message(mut self, f: ErrorMessageFn) -> Self {
        self.on_error_message = Some(f);
        self
    }

    fn failure_message(&self, command: &str, status: i32) -> String {
        match self.on_error_message {
            Some(f) => f(command, status),
            None => format!("Command {} failed with status {}", command, status),
        }
    }
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Create a new output pair
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// Runs shell commands and classifies them by exit status
pub trait CommandRunner {
    /// Run a command. A non-zero exit status is an error.
    fn run(&self, command: &str, options: &RunOptions) -> Result<CommandOutput, CommandError>;

    /// Run a command and return its trimmed stdout, echoing output only on failure
    fn output_of(&self, command: &str) -> Result<String, CommandError> {
        self.run(command, &RunOptions::new(PrintMode::Error))
            .map(|output| output.stdout.trim().to_string())
    }

    /// Run a command and return its trimmed stdout, or `fallback` if it fails
    fn output_or(&self, command: &str, fallback: &str) -> String {
        match self.run(command, &RunOptions::new(PrintMode::Nothing)) {
            Ok(output) => output.stdout.trim().to_string(),
            Err(_) => fallback.to_string(),
        }
    }
}

/// Command runner backed by the system shell
#[derive(Debug, Clone)]
pub struct ShellRunner {
    /// Directory every command runs in
    working_dir: PathBuf,
    logger: Logger,
}

impl ShellRunner {
    /// Create a runner rooted at `working_dir`
    pub fn new(working_dir: impl Into<PathBuf>, logger: Logger) -> Self {
        Self {
            working_dir: working_dir.into(),
            logger,
        }
    }

    /// Directory commands run in
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn spawn(&self, command: &str) -> std::io::Result<Output> {
        shell_command(command).current_dir(&self.working_dir).output()
    }

    fn echo(&self, output: &CommandOutput, as_error: bool) {
        for stream in [&output.stderr, &output.stdout] {
            let text = indent_output(stream, OUTPUT_PREFIX);
            if text.is_empty() {
                continue;
            }
            if as_error {
                self.logger.error(text);
            } else {
                self.logger.info(text);
            }
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str, options: &RunOptions) -> Result<CommandOutput, CommandError> {
        self.logger.info(format!("Running `{}`", command));

        let output = self.spawn(command).map_err(|source| CommandError::Spawn {
            command: command.to_string(),
            source,
        })?;

        let captured = CommandOutput::new(
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );

        if !output.status.success() {
            let status = output.status.code().unwrap_or(-1);
            if options.print.echo_on_failure() {
                self.echo(&captured, true);
            }
            return Err(CommandError::Failed {
                command: command.to_string(),
                status,
                message: options.failure_message(command, status),
                stdout: captured.stdout,
                stderr: captured.stderr,
            });
        }

        if options.print.echo_on_success() {
            self.echo(&captured, false);
        }
        Ok(captured)
    }
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

/// Quote a value for safe use as a single POSIX shell word
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
