//! Console logging for release runs
//!
//! Every line carries the `[monorel]` prefix. Regular progress goes to stdout,
//! warnings, errors and debug detail go to stderr. Debug output is only shown
//! in verbose mode.

use colored::Colorize;

/// Prefix printed in front of every log line
pub const LOG_PREFIX: &str = "[monorel]";

/// Lightweight, copyable console logger
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger {
    verbose: bool,
}

impl Logger {
    /// Create a new logger
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Whether debug output is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Regular progress message
    pub fn info(&self, message: impl AsRef<str>) {
        println!("{} {}", LOG_PREFIX.dimmed(), message.as_ref());
    }

    /// Highlighted completion message
    pub fn success(&self, message: impl AsRef<str>) {
        println!("{} {}", LOG_PREFIX.dimmed(), message.as_ref().green());
    }

    /// Verbose-only detail
    pub fn debug(&self, message: impl AsRef<str>) {
        if self.verbose {
            eprintln!("{} {}", LOG_PREFIX.dimmed(), message.as_ref().dimmed());
        }
    }

    /// Warning
    pub fn warn(&self, message: impl AsRef<str>) {
        eprintln!("{} {}", LOG_PREFIX.dimmed(), message.as_ref().yellow());
    }

    /// Error
    pub fn error(&self, message: impl AsRef<str>) {
        eprintln!("{} {}", LOG_PREFIX.dimmed(), message.as_ref().red());
    }
}

/// Indent captured command output, dropping blank lines.
///
/// Returns an empty string when there is nothing to show.
pub fn indent_output(output: &str, prefix: &str) -> String {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}
