//! Error types for `notesmith`
//!
//! Every failure surfaces as a [`NotesmithError`], which maps to a process
//! exit code through [`NotesmithError::exit_code`].

use std::time::Duration;

use thiserror::Error;

pub use notesmith_core::ValidationError;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `notesmith` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Input rejected by validation (empty title, title too long)
    pub const VALIDATION_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Transport error (MCP stdio failure)
    pub const TRANSPORT_ERROR: i32 = 4;

    /// Script interpreter error (spawn failure, timeout, non-zero exit)
    pub const SCRIPT_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `notesmith` operations.
#[derive(Debug, Error)]
pub enum NotesmithError {
    /// Caller input rejected before any script was generated
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Script interpreter failure
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// MCP transport failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Invalid command-line usage not caught by the argument parser
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NotesmithError {
    /// Returns the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => ExitCode::VALIDATION_ERROR,
            Self::Script(_) => ExitCode::SCRIPT_ERROR,
            Self::Transport(_) => ExitCode::TRANSPORT_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Script Errors
// ============================================================================

/// Failures running a generated script through the interpreter.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The interpreter could not be started or fed its script.
    #[error("failed to run interpreter: {0}")]
    SpawnFailed(String),

    /// The interpreter did not finish in time and was killed.
    #[error("script timed out after {}", humantime::format_duration(*.after))]
    Timeout {
        /// Configured time limit
        after: Duration,
    },

    /// The interpreter exited unsuccessfully.
    #[error("interpreter exited with {}: {}", describe_exit(.code), .stderr.trim())]
    NonZeroExit {
        /// Exit code, or `None` if the process was killed by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// The interpreter's output could not be used.
    #[error("invalid interpreter output: {0}")]
    InvalidOutput(String),
}

#[allow(clippy::ref_option)] // called with a field reference from the error formatter
fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}"))
}

// ============================================================================
// Transport Errors
// ============================================================================

/// Transport layer errors for the stdio MCP transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O error during transport operations
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `notesmith` operations.
pub type Result<T> = std::result::Result<T, NotesmithError>;

// ============================================================================
// Tests
// ============================================================================
