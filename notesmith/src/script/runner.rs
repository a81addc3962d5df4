//! Script execution.
//!
//! [`InterpreterRunner`] spawns the configured interpreter, writes the
//! script to its stdin and collects stdout. The whole exchange runs under
//! the configured timeout. Neither stream is buffered past the output
//! limit; a child that overruns either bound is killed when its handle is
//! dropped.

use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

use crate::config::RunnerConfig;
use crate::error::ScriptError;

use super::Script;

/// Executes generated scripts.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Runs `script` and returns its trimmed standard output.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError`] if the script cannot be run to a successful
    /// exit or its output is unusable.
    async fn run(&self, script: &Script) -> Result<String, ScriptError>;
}

/// Runs scripts through an external interpreter process.
#[derive(Debug, Clone, Default)]
pub struct InterpreterRunner {
    config: RunnerConfig,
}

impl InterpreterRunner {
    /// Creates a runner with the given settings.
    #[must_use]
    pub const fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Returns the runner settings.
    #[must_use]
    pub const fn config(&self) -> &RunnerConfig {
        &self.config
    }
}

#[async_trait]
impl ScriptRunner for InterpreterRunner {
    async fn run(&self, script: &Script) -> Result<String, ScriptError> {
        let Some((program, args)) = self.config.command.split_first() else {
            return Err(ScriptError::SpawnFailed(
                "empty interpreter command".to_string(),
            ));
        };

        debug!(
            script = script.name(),
            program = %program,
            bytes = script.source().len(),
            "running script"
        );

        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ScriptError::SpawnFailed(format!("{program}: {e}")))?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let max_output = self.config.max_output;

        let exchange = async move {
            let write = async move {
                let Some(mut stdin) = stdin else {
                    return Ok(());
                };
                match stdin.write_all(script.source().as_bytes()).await {
                    Ok(()) => Ok(()),
                    // The exit status says more than the pipe does.
                    Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                        debug!(script = script.name(), "interpreter closed stdin early");
                        Ok(())
                    }
                    Err(e) => Err(ScriptError::SpawnFailed(format!(
                        "failed to write script to stdin: {e}"
                    ))),
                }
            };

            // Reading stops one byte past the limit; the child is killed
            // when the exchange is dropped.
            let read_stdout = async move {
                let mut buf = Vec::new();
                if let Some(stdout) = stdout {
                    let limit = u64::try_from(max_output)
                        .unwrap_or(u64::MAX)
                        .saturating_add(1);
                    stdout
                        .take(limit)
                        .read_to_end(&mut buf)
                        .await
                        .map_err(|e| {
                            ScriptError::SpawnFailed(format!("failed to read stdout: {e}"))
                        })?;
                }
                if buf.len() > max_output {
                    return Err(ScriptError::InvalidOutput(format!(
                        "stdout exceeds {max_output} byte limit"
                    )));
                }
                Ok(buf)
            };

            let read_stderr = async move {
                match stderr {
                    Some(stderr) => read_capped(stderr, max_output).await.map_err(|e| {
                        ScriptError::SpawnFailed(format!("failed to read stderr: {e}"))
                    }),
                    None => Ok(Vec::new()),
                }
            };

            let ((), stdout, stderr) = tokio::try_join!(write, read_stdout, read_stderr)?;
            let status = child
                .wait()
                .await
                .map_err(|e| ScriptError::SpawnFailed(e.to_string()))?;
            Ok::<_, ScriptError>((status, stdout, stderr))
        };

        let (status, stdout, stderr) = tokio::time::timeout(self.config.timeout, exchange)
            .await
            .map_err(|_| ScriptError::Timeout {
                after: self.config.timeout,
            })??;

        let stderr = String::from_utf8_lossy(&stderr).to_string();

        if !status.success() {
            return Err(ScriptError::NonZeroExit {
                code: status.code(),
                stderr,
            });
        }

        if !stderr.trim().is_empty() {
            warn!(
                script = script.name(),
                stderr = %stderr.trim(),
                "interpreter produced stderr output"
            );
        }

        let stdout = String::from_utf8(stdout)
            .map_err(|_| ScriptError::InvalidOutput("stdout is not valid UTF-8".to_string()))?;

        Ok(stdout.trim().to_string())
    }
}

/// Reads `reader` to the end, keeping at most the first `cap` bytes.
async fn read_capped<R>(mut reader: R, cap: usize) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut kept = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(kept);
        }
        let room = cap.saturating_sub(kept.len());
        kept.extend_from_slice(&chunk[..n.min(room)]);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn runner(command: &[&str]) -> InterpreterRunner {
        InterpreterRunner::new(RunnerConfig {
            command: command.iter().map(ToString::to_string).collect(),
            ..RunnerConfig::default()
        })
    }

    fn script(source: &str) -> Script {
        Script::new("fixture", source.to_string())
    }

    #[tokio::test]
    async fn test_script_is_written_to_stdin() {
        let output = runner(&["cat"])
            .run(&script("tell application \"Notes\"\nend tell\n"))
            .await
            .unwrap();
        assert_eq!(output, "tell application \"Notes\"\nend tell");
    }

    #[tokio::test]
    async fn test_arguments_are_passed() {
        let output = runner(&["sh", "-c", "cat >/dev/null; printf 'Notes\\nWork\\n'"])
            .run(&script("ignored"))
            .await
            .unwrap();
        assert_eq!(output, "Notes\nWork");
    }

    #[tokio::test]
    async fn test_empty_command() {
        let err = runner(&[]).run(&script("x")).await.unwrap_err();
        assert!(matches!(err, ScriptError::SpawnFailed(_)));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = runner(&["notesmith-no-such-interpreter"])
            .run(&script("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::SpawnFailed(_)));
        assert!(err.to_string().contains("notesmith-no-such-interpreter"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_keeps_stderr() {
        let err = runner(&["sh", "-c", "cat >/dev/null; echo 'no such note' >&2; exit 3"])
            .run(&script("x"))
            .await
            .unwrap_err();
        match err {
            ScriptError::NonZeroExit { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr.trim(), "no such note");
            }
            other => panic!("expected NonZeroExit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stderr_on_success_is_not_an_error() {
        let output = runner(&["sh", "-c", "cat >/dev/null; echo warn >&2; echo ok"])
            .run(&script("x"))
            .await
            .unwrap();
        assert_eq!(output, "ok");
    }

    #[tokio::test]
    async fn test_timeout() {
        let runner = InterpreterRunner::new(RunnerConfig {
            command: vec!["sleep".to_string(), "5".to_string()],
            timeout: Duration::from_millis(100),
            ..RunnerConfig::default()
        });
        let err = runner.run(&script("x")).await.unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Timeout { after } if after == Duration::from_millis(100)
        ));
    }

    #[tokio::test]
    async fn test_output_limit() {
        let runner = InterpreterRunner::new(RunnerConfig {
            command: vec!["cat".to_string()],
            max_output: 4,
            ..RunnerConfig::default()
        });
        let err = runner.run(&script("longer than four")).await.unwrap_err();
        assert!(matches!(err, ScriptError::InvalidOutput(_)));
    }

    #[tokio::test]
    async fn test_endless_output_stops_at_limit() {
        let runner = InterpreterRunner::new(RunnerConfig {
            command: vec!["yes".to_string()],
            timeout: Duration::from_secs(10),
            max_output: 16,
        });
        let err = runner.run(&script("x")).await.unwrap_err();
        assert!(matches!(err, ScriptError::InvalidOutput(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_stderr_is_capped() {
        let runner = InterpreterRunner::new(RunnerConfig {
            command: vec![
                "sh".to_string(),
                "-c".to_string(),
                "cat >/dev/null; yes 2>/dev/null | head -c 100000 >&2; exit 1".to_string(),
            ],
            max_output: 16,
            ..RunnerConfig::default()
        });
        let err = runner.run(&script("x")).await.unwrap_err();
        match err {
            ScriptError::NonZeroExit { stderr, .. } => assert_eq!(stderr.len(), 16),
            other => panic!("expected NonZeroExit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_utf8_output() {
        let err = runner(&["sh", "-c", "cat >/dev/null; printf '\\377'"])
            .run(&script("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::InvalidOutput(_)));
    }
}
