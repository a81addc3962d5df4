//! Observability.
//!
//! Structured logging to stderr. stdout carries command output and MCP
//! frames only.

pub mod logging;

pub use logging::{LOG_LEVEL_ENV, LogFormat, init_logging};
