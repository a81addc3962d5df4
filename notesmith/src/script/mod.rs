//! Generated scripts and the interpreter that runs them.
//!
//! A [`Script`] is an AppleScript program built by one of the
//! [`templates`]. Templates only accept
//! [`EscapedLiteral`](notesmith_core::EscapedLiteral) values for their
//! slots, so caller text can reach script source only after escaping.
//! A [`ScriptRunner`] executes the program and returns its output.

pub mod runner;
pub mod templates;
#[cfg(test)]
pub(crate) mod testing;

pub use runner::{InterpreterRunner, ScriptRunner};

use std::fmt;

/// A generated script program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    name: &'static str,
    source: String,
}

impl Script {
    pub(crate) const fn new(name: &'static str, source: String) -> Self {
        Self { name, source }
    }

    /// Returns the template name, used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the program text written to the interpreter.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Splits newline-separated interpreter output into its non-empty lines.
#[must_use]
pub fn output_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}
