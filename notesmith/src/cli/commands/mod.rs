//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod completions;
pub mod convert;
pub mod notes;
pub mod serve;
pub mod version;

use std::path::Path;

use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands, RunnerArgs};
use crate::error::NotesmithError;
use crate::notes::NotesService;
use crate::script::InterpreterRunner;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// A cancelled `cancel` token stops the running command; the interpreter
/// child, if any, is killed.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), NotesmithError> {
    match cli.command {
        Commands::Notes(command) => {
            let service = build_service(&cli.runner)?;
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::warn!("interrupted, abandoning notes command");
                    Ok(())
                }
                result = notes::run(command, &service) => result,
            }
        }
        Commands::Render(args) => convert::render(&args).await,
        Commands::Extract(args) => convert::extract(&args).await,
        Commands::Escape(args) => convert::escape(&args).await,
        Commands::Serve => serve::run(&cli.runner, cancel).await,
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Builds a [`NotesService`] over the configured interpreter.
///
/// # Errors
///
/// Returns a usage error if the interpreter command line is invalid.
pub fn build_service(
    runner: &RunnerArgs,
) -> Result<NotesService<InterpreterRunner>, NotesmithError> {
    let config = runner.runner_config()?;
    tracing::debug!(
        interpreter = ?config.command,
        timeout = %humantime::format_duration(config.timeout),
        "interpreter configured"
    );
    Ok(NotesService::new(
        InterpreterRunner::new(config),
        runner.default_folder.clone(),
    ))
}

/// Reads command input from a file, or from stdin when `path` is absent or
/// `-`.
///
/// # Errors
///
/// Returns an I/O error naming the path if it cannot be read.
pub async fn read_input(path: Option<&Path>) -> Result<String, NotesmithError> {
    match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| {
                NotesmithError::Io(std::io::Error::new(
                    e.kind(),
                    format!("{}: {e}", path.display()),
                ))
            }),
        _ => {
            let mut input = String::new();
            tokio::io::stdin().read_to_string(&mut input).await?;
            Ok(input)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn test_read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "# Title").unwrap();
        let text = read_input(Some(file.path())).await.unwrap();
        assert_eq!(text, "# Title");
    }

    #[tokio::test]
    async fn test_read_input_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.md");
        let err = read_input(Some(&path)).await.unwrap_err();
        assert!(matches!(err, NotesmithError::Io(_)));
        assert!(err.to_string().contains("absent.md"));
    }

    #[test]
    fn test_build_service_rejects_bad_interpreter() {
        let runner = RunnerArgs {
            interpreter: "sh -c 'unterminated".to_string(),
            timeout: std::time::Duration::from_secs(1),
            max_output: 1024,
            default_folder: "Notes".to_string(),
        };
        let err = build_service(&runner).unwrap_err();
        assert!(matches!(err, NotesmithError::Usage(_)));
    }

    #[test]
    fn test_build_service_uses_default_folder() {
        let runner = RunnerArgs {
            interpreter: "osascript".to_string(),
            timeout: std::time::Duration::from_secs(1),
            max_output: 1024,
            default_folder: "Inbox".to_string(),
        };
        let service = build_service(&runner).unwrap();
        assert_eq!(service.default_folder(), "Inbox");
        assert_eq!(service.runner().config().program(), "osascript");
    }
}
