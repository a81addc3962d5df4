//! Shared integration-test harness for running the `notesmith` binary,
//! either as a one-shot command or as an MCP server over stdio.

#![allow(dead_code)]

use std::io::Write;
use std::process::{Output, Stdio};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};

/// Default timeout for reading a single message from the server.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Interpreter that discards the script and prints `reply`.
///
/// `reply` is a `printf` format, so `\n` separates lines. It must not
/// contain quotes.
#[must_use]
pub fn replying_interpreter(reply: &str) -> String {
    format!("sh -c \"cat >/dev/null; printf '{reply}'\"")
}

/// Interpreter that discards the script, prints `stderr` to standard
/// error, and exits with status 1. `stderr` must not contain quotes.
#[must_use]
pub fn failing_interpreter(stderr: &str) -> String {
    format!("sh -c \"cat >/dev/null; echo '{stderr}' >&2; exit 1\"")
}

/// Runs `notesmith` with `args` and no stdin.
#[allow(clippy::missing_panics_doc)]
#[must_use]
pub fn run_command(args: &[&str]) -> Output {
    run_command_with_stdin(args, "")
}

/// Runs `notesmith` with `args`, writing `stdin` to its standard input.
#[allow(clippy::missing_panics_doc)]
#[must_use]
pub fn run_command_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = std::process::Command::new(env!("CARGO_BIN_EXE_notesmith"))
        .args(args)
        .arg("--quiet")
        .env_remove("NOTESMITH_INTERPRETER")
        .env_remove("NOTESMITH_FOLDER")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn notesmith");
    // Commands that never read stdin may exit before the write lands.
    let _ = child
        .stdin
        .take()
        .expect("stdin not captured")
        .write_all(stdin.as_bytes());
    child.wait_with_output().expect("failed to wait for notesmith")
}

/// Returns the process's stdout as a string.
#[must_use]
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// A running `notesmith serve` process with helpers for JSON-RPC I/O.
///
/// The child process is killed on drop via `kill_on_drop(true)`.
pub struct ServerProcess {
    child: Child,
    stdin: Option<tokio::process::ChildStdin>,
    reader: BufReader<tokio::process::ChildStdout>,
    next_id: i64,
}

impl ServerProcess {
    /// Spawns `notesmith serve` with the given interpreter command line.
    #[allow(clippy::missing_panics_doc)]
    #[must_use]
    pub fn spawn(interpreter: &str) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_notesmith"))
            .args(["serve", "--quiet", "--interpreter", interpreter])
            .env_remove("NOTESMITH_FOLDER")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .expect("failed to spawn notesmith serve");

        let stdin = child.stdin.take().expect("stdin not captured");
        let stdout = child.stdout.take().expect("stdout not captured");

        Self {
            child,
            stdin: Some(stdin),
            reader: BufReader::new(stdout),
            next_id: 1,
        }
    }

    /// Writes one raw line to the server.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send_line(&mut self, line: &str) {
        let stdin = self.stdin.as_mut().expect("stdin already closed");
        stdin
            .write_all(format!("{line}\n").as_bytes())
            .await
            .expect("failed to write to stdin");
        stdin.flush().await.expect("failed to flush stdin");
    }

    /// Reads one NDJSON message from the server's stdout.
    ///
    /// Panics on EOF, I/O error, or if no message arrives within `timeout`.
    #[allow(clippy::missing_panics_doc)]
    pub async fn read_message(&mut self, timeout: Duration) -> Value {
        let mut line = String::new();
        let result = tokio::time::timeout(timeout, async {
            loop {
                line.clear();
                let n = self
                    .reader
                    .read_line(&mut line)
                    .await
                    .expect("read_line I/O error");
                assert!(n > 0, "unexpected EOF from server");
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    return serde_json::from_str::<Value>(trimmed)
                        .unwrap_or_else(|e| panic!("invalid JSON from server: {e}\nline: {line}"));
                }
            }
        })
        .await;
        result.expect("timed out waiting for message from server")
    }

    /// Sends a JSON-RPC request and returns the next message, which must be
    /// its response.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send_request(&mut self, method: &str, params: Option<Value>) -> Value {
        let id = self.next_id;
        self.next_id += 1;

        let mut request = json!({ "jsonrpc": "2.0", "id": id, "method": method });
        if let Some(params) = params {
            request["params"] = params;
        }
        self.send_line(&request.to_string()).await;

        let response = self.read_message(DEFAULT_TIMEOUT).await;
        assert_eq!(response["id"], json!(id), "response out of order: {response}");
        response
    }

    /// Sends the MCP `initialize` handshake and returns the response.
    pub async fn send_initialize(&mut self) -> Value {
        let response = self
            .send_request(
                "initialize",
                Some(json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "integration-test", "version": "0.0.1" }
                })),
            )
            .await;
        self.send_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        response
    }

    /// Calls a tool and returns the `result` object.
    #[allow(clippy::missing_panics_doc)]
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Value {
        let response = self
            .send_request(
                "tools/call",
                Some(json!({ "name": name, "arguments": arguments })),
            )
            .await;
        response
            .get("result")
            .cloned()
            .unwrap_or_else(|| panic!("tools/call returned an error: {response}"))
    }

    /// Closes stdin and waits for the server to exit.
    ///
    /// Returns the exit code, or `None` if the server had to be killed.
    #[allow(clippy::missing_panics_doc)]
    pub async fn shutdown(mut self) -> Option<i32> {
        drop(self.stdin.take());
        match tokio::time::timeout(Duration::from_secs(5), self.child.wait()).await {
            Ok(status) => status.expect("failed to wait for server").code(),
            Err(_) => {
                self.child.kill().await.expect("failed to kill child");
                None
            }
        }
    }
}
