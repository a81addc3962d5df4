//! Runtime configuration.
//!
//! Settings come from command-line flags with environment-variable
//! fallbacks (see [`RunnerArgs`](crate::cli::args::RunnerArgs)); there is no
//! configuration file. This module holds the resolved values and their
//! defaults.

use std::time::Duration;

use crate::error::NotesmithError;

/// Interpreter used when none is configured.
pub const DEFAULT_INTERPRETER: &str = "osascript";

/// Time limit for a single script run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum interpreter stdout accepted, in bytes (10 MiB).
pub const DEFAULT_MAX_OUTPUT: usize = 10 * 1024 * 1024;

/// Folder new notes are created in when none is given.
pub const DEFAULT_FOLDER: &str = "Notes";

/// Resolved settings for [`InterpreterRunner`](crate::script::InterpreterRunner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Interpreter program followed by its arguments.
    pub command: Vec<String>,
    /// Time limit for one script run.
    pub timeout: Duration,
    /// Maximum stdout size in bytes; stderr is cut to the same length.
    pub max_output: usize,
}

impl RunnerConfig {
    /// Builds a config from an interpreter command line such as
    /// `osascript -l AppleScript`, split with shell quoting rules.
    ///
    /// # Errors
    ///
    /// Returns [`NotesmithError::Usage`] if the command line is empty or has
    /// unbalanced quotes.
    pub fn from_command_line(
        command_line: &str,
        timeout: Duration,
        max_output: usize,
    ) -> Result<Self, NotesmithError> {
        let command = parse_command_line(command_line)?;
        Ok(Self {
            command,
            timeout,
            max_output,
        })
    }

    /// Returns the interpreter program name.
    #[must_use]
    pub fn program(&self) -> &str {
        self.command.first().map_or("", String::as_str)
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: vec![DEFAULT_INTERPRETER.to_string()],
            timeout: DEFAULT_TIMEOUT,
            max_output: DEFAULT_MAX_OUTPUT,
        }
    }
}

/// Splits an interpreter command line into program and arguments.
///
/// # Errors
///
/// Returns [`NotesmithError::Usage`] if the line is blank or cannot be
/// split.
pub fn parse_command_line(command_line: &str) -> Result<Vec<String>, NotesmithError> {
    match shlex::split(command_line) {
        Some(words) if !words.is_empty() => Ok(words),
        Some(_) => Err(NotesmithError::Usage(
            "interpreter command cannot be empty".to_string(),
        )),
        None => Err(NotesmithError::Usage(format!(
            "invalid interpreter command: {command_line}"
        ))),
    }
}
