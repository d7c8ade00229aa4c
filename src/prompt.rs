//! Interactive version selection
//!
//! When no `--version` is given the user picks one of the suggested versions
//! or types their own. Without a terminal on stdin nothing is asked and no
//! version is chosen.

use crate::version::VersionSuggestion;
use std::io::{self, BufRead, IsTerminal, Write};

/// Asks the user for the release version
pub trait Prompter {
    /// Pick a suggestion or return an override; `None` means no version was chosen
    fn choose_version(&self, suggestions: &[VersionSuggestion]) -> Option<String>;
}

/// Prompter reading from stdin and writing to stderr
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    /// Create a new terminal prompter
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for TerminalPrompter {
    fn choose_version(&self, suggestions: &[VersionSuggestion]) -> Option<String> {
        if !io::stdin().is_terminal() {
            return None;
        }

        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "No --version given. Suggested versions:");
        for (index, suggestion) in suggestions.iter().enumerate() {
            let _ = writeln!(
                stderr,
                "  {}) {} ({})",
                index + 1,
                suggestion.version,
                suggestion.label
            );
        }
        if suggestions.is_empty() {
            let _ = write!(stderr, "Version to release: ");
        } else {
            let _ = write!(stderr, "Pick a number or type a version [1]: ");
        }
        let _ = stderr.flush();

        read_answer(&mut io::stdin().lock(), suggestions)
    }
}

/// Prompter that never chooses; used for non-interactive runs
#[derive(Debug, Default)]
pub struct NoPrompt;

impl Prompter for NoPrompt {
    fn choose_version(&self, _: &[VersionSuggestion]) -> Option<String> {
        None
    }
}

/// Read one answer line. End of input chooses nothing.
fn read_answer(input: &mut impl BufRead, suggestions: &[VersionSuggestion]) -> Option<String> {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => interpret_answer(&line, suggestions),
    }
}

/// Map a typed answer to a version: empty picks the first suggestion, a number
/// picks that suggestion, anything else is taken as the version itself.
pub fn interpret_answer(answer: &str, suggestions: &[VersionSuggestion]) -> Option<String> {
    let answer = answer.trim();
    if answer.is_empty() {
        return suggestions.first().map(|s| s.version.clone());
    }
    if let Ok(index) = answer.parse::<usize>() {
        if let Some(suggestion) = index.checked_sub(1).and_then(|i| suggestions.get(i)) {
            return Some(suggestion.version.clone());
        }
    }
    Some(answer.to_string())
}
