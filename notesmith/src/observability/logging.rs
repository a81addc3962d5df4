//! Logging setup.
//!
//! Everything goes to stderr; stdout carries command output and MCP frames.

use std::io::IsTerminal;

use clap::ValueEnum;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::args::ColorChoice;

/// Environment variable holding an `EnvFilter` directive; overrides `-v`.
pub const LOG_LEVEL_ENV: &str = "NOTESMITH_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON for machine consumption.
    Json,
}

/// Level enabled by `verbosity` repeated `-v` flags; saturates at trace.
#[must_use]
pub const fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Builds the event filter. A valid `directive` wins over `verbosity`; an
/// invalid one is ignored.
#[must_use]
pub fn build_filter(directive: Option<&str>, verbosity: u8) -> EnvFilter {
    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(level_for(verbosity).into()))
}

/// Resolves whether stderr output should carry ANSI colors.
#[must_use]
pub fn use_ansi(color: ColorChoice) -> bool {
    match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
        }
    }
}

/// Installs the global subscriber.
///
/// Only the first call in a process has any effect.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let directive = std::env::var(LOG_LEVEL_ENV).ok();
    let filter = build_filter(directive.as_deref(), verbosity);
    let show_target = verbosity >= 2;

    let (human, json) = match format {
        LogFormat::Human => (
            Some(
                fmt::layer()
                    .with_ansi(use_ansi(color))
                    .with_target(show_target)
                    .with_writer(std::io::stderr),
            ),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                fmt::layer()
                    .json()
                    .with_target(show_target)
                    .with_writer(std::io::stderr),
            ),
        ),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(human)
        .with(json)
        .try_init();
}
