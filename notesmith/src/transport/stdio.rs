//! Stdio transport.
//!
//! Newline-delimited JSON over stdin/stdout, the standard MCP transport for
//! locally launched servers.
//!
//! Input handling:
//!
//! - A final line without `\n` is still read.
//! - Blank lines are skipped.
//! - Lines longer than the size limit are drained without being buffered
//!   and skipped.
//! - Lines that are not UTF-8 or not a JSON-RPC message are logged and
//!   skipped.

use std::io;
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::Mutex;

use super::{
    DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_STDIO_BUFFER_SIZE, JsonRpcMessage, Result, Transport,
};

type BoxedReader = Box<dyn AsyncBufRead + Unpin + Send>;
type BoxedWriter = Box<dyn AsyncWrite + Unpin + Send>;

/// Stdio transport limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdioConfig {
    /// Maximum message size in bytes.
    pub max_message_size: usize,
    /// Read/write buffer size in bytes.
    pub buffer_size: usize,
}

impl StdioConfig {
    /// Loads limits from the environment, falling back to defaults.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `NOTESMITH_MAX_MESSAGE_SIZE` | 10 MB |
    /// | `NOTESMITH_STDIO_BUFFER_SIZE` | 64 KB |
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_message_size: env_or("NOTESMITH_MAX_MESSAGE_SIZE", DEFAULT_MAX_MESSAGE_SIZE),
            buffer_size: env_or("NOTESMITH_STDIO_BUFFER_SIZE", DEFAULT_STDIO_BUFFER_SIZE),
        }
    }
}

impl Default for StdioConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            buffer_size: DEFAULT_STDIO_BUFFER_SIZE,
        }
    }
}

/// NDJSON transport.
///
/// Reader and writer sit behind separate async mutexes; each lock is held
/// across `.await` points.
pub struct StdioTransport {
    reader: Mutex<BoxedReader>,
    writer: Mutex<BoxedWriter>,
    config: StdioConfig,
}

impl StdioTransport {
    /// Creates a transport over the process's stdin and stdout, with limits
    /// from the environment.
    #[must_use]
    pub fn new() -> Self {
        let config = StdioConfig::from_env();
        Self::from_streams(tokio::io::stdin(), tokio::io::stdout(), config)
    }

    /// Creates a transport over arbitrary streams.
    pub fn from_streams<R, W>(reader: R, writer: W, config: StdioConfig) -> Self
    where
        R: tokio::io::AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self {
            reader: Mutex::new(Box::new(BufReader::with_capacity(config.buffer_size, reader))),
            writer: Mutex::new(Box::new(BufWriter::with_capacity(config.buffer_size, writer))),
            config,
        }
    }

    /// Returns the transport limits.
    #[must_use]
    pub const fn config(&self) -> &StdioConfig {
        &self.config
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StdioTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdioTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl Transport for StdioTransport {
    async fn send_message(&self, message: &JsonRpcMessage) -> Result<()> {
        let serialized = serde_json::to_string(message)?;
        let mut writer = self.writer.lock().await;
        writer.write_all(serialized.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        drop(writer);
        Ok(())
    }

    #[allow(clippy::significant_drop_tightening)] // reader must be held across the loop
    async fn receive_message(&self) -> Result<Option<JsonRpcMessage>> {
        let mut reader = self.reader.lock().await;
        let limit = self.config.max_message_size;
        let mut buf: Vec<u8> = Vec::with_capacity(limit.min(DEFAULT_STDIO_BUFFER_SIZE));

        loop {
            buf.clear();
            match read_bounded_line(&mut *reader, &mut buf, limit).await? {
                LineRead::Eof => return Ok(None),
                LineRead::Overflow => {
                    tracing::warn!(limit, "message exceeds size limit, skipping");
                    continue;
                }
                LineRead::Line => {}
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(s) => s.trim(),
                Err(e) => {
                    tracing::warn!("invalid UTF-8 in message, skipping line: {e}");
                    continue;
                }
            };

            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<JsonRpcMessage>(line) {
                Ok(message) => return Ok(Some(message)),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        line = %sanitize_for_log(line, 200),
                        "invalid JSON-RPC message, skipping"
                    );
                }
            }
        }
    }
}

/// Outcome of [`read_bounded_line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineRead {
    /// End of input with nothing buffered.
    Eof,
    /// A complete line (without its `\n`) is in the buffer.
    Line,
    /// The line was longer than the limit and has been drained.
    Overflow,
}

/// Reads one line into `buf`, copying at most `limit` bytes.
///
/// Works directly on the reader's internal buffer with `fill_buf` and
/// `consume`, so an overlong line is discarded chunk by chunk instead of
/// being accumulated.
async fn read_bounded_line<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    limit: usize,
) -> io::Result<LineRead>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut overflowed = false;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(match (overflowed, buf.is_empty()) {
                (true, _) => LineRead::Overflow,
                (false, true) => LineRead::Eof,
                (false, false) => LineRead::Line,
            });
        }

        let newline = available.iter().position(|&b| b == b'\n');
        let chunk = newline.map_or(available, |pos| &available[..pos]);

        if !overflowed {
            if buf.len() + chunk.len() > limit {
                overflowed = true;
                buf.clear();
            } else {
                buf.extend_from_slice(chunk);
            }
        }

        let consumed = newline.map_or(available.len(), |pos| pos + 1);
        reader.consume(consumed);

        if newline.is_some() {
            return Ok(if overflowed {
                LineRead::Overflow
            } else {
                LineRead::Line
            });
        }
    }
}

/// Truncates and strips control characters from untrusted input before
/// logging.
fn sanitize_for_log(input: &str, max_len: usize) -> String {
    input
        .chars()
        .take(max_len)
        .map(|c| {
            if c.is_control() && c != '\t' {
                '\u{FFFD}'
            } else {
                c
            }
        })
        .collect()
}

/// Reads and parses an environment variable, or returns `default`.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(v) => v.parse().unwrap_or_else(|_| {
            tracing::warn!(name, value = %v, "invalid env var value, using default");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio_test::io::Builder;

    use super::*;
    use crate::transport::JsonRpcResponse;

    fn reading(input: &[u8], config: StdioConfig) -> StdioTransport {
        let reader = Builder::new().read(input).build();
        StdioTransport::from_streams(reader, tokio::io::sink(), config)
    }

    #[test]
    fn test_stdio_config_default() {
        let config = StdioConfig::default();
        assert_eq!(config.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(config.buffer_size, DEFAULT_STDIO_BUFFER_SIZE);
    }

    #[test]
    fn test_env_or_default() {
        let result: usize = env_or("NOTESMITH_TEST_NONEXISTENT_VAR_12345", 42);
        assert_eq!(result, 42);
    }

    #[test]
    fn test_sanitize_for_log() {
        assert_eq!(sanitize_for_log("a\u{1b}[31mb\tc", 200), "a\u{FFFD}[31mb\tc");
        assert_eq!(sanitize_for_log("abcdef", 3), "abc");
    }

    #[tokio::test]
    async fn test_reads_messages_in_order() {
        let transport = reading(
            b"{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":1}\n{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":2}\n",
            StdioConfig::default(),
        );
        let first = transport.receive_message().await.unwrap().unwrap();
        let second = transport.receive_message().await.unwrap().unwrap();
        assert_eq!(first.id(), Some(&json!(1)));
        assert_eq!(second.id(), Some(&json!(2)));
        assert!(transport.receive_message().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let transport = reading(
            b"{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":1}",
            StdioConfig::default(),
        );
        assert!(transport.receive_message().await.unwrap().is_some());
        assert!(transport.receive_message().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_skips_blank_garbage_and_non_utf8_lines() {
        let mut input = b"\n   \nnot json\n[1,2]\n".to_vec();
        input.extend_from_slice(&[0xff, 0xfe, b'\n']);
        input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"method\":\"tools/list\",\"id\":9}\n");
        let transport = reading(&input, StdioConfig::default());

        let message = transport.receive_message().await.unwrap().unwrap();
        assert_eq!(message.method(), Some("tools/list"));
    }

    #[tokio::test]
    async fn test_oversized_line_is_skipped() {
        let config = StdioConfig {
            max_message_size: 64,
            buffer_size: 16,
        };
        let mut input = vec![b'x'; 500];
        input.push(b'\n');
        input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":3}\n");
        let transport = reading(&input, config);

        let message = transport.receive_message().await.unwrap().unwrap();
        assert_eq!(message.id(), Some(&json!(3)));
    }

    #[tokio::test]
    async fn test_oversized_final_line_is_eof() {
        let config = StdioConfig {
            max_message_size: 8,
            buffer_size: 4,
        };
        let transport = reading(&[b'y'; 100], config);
        assert!(transport.receive_message().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_send_writes_one_line() {
        let writer = Builder::new()
            .write(b"{\"jsonrpc\":\"2.0\",\"result\":{},\"id\":1}\n")
            .build();
        let transport =
            StdioTransport::from_streams(tokio::io::empty(), writer, StdioConfig::default());
        let message = JsonRpcMessage::Response(JsonRpcResponse::success(json!(1), json!({})));
        transport.send_message(&message).await.unwrap();
    }

    #[tokio::test]
    async fn test_read_bounded_line_exact_limit() {
        let mut reader = BufReader::with_capacity(2, &b"abcd\nabcde\n"[..]);
        let mut buf = Vec::new();
        assert_eq!(
            read_bounded_line(&mut reader, &mut buf, 4).await.unwrap(),
            LineRead::Line
        );
        assert_eq!(buf, b"abcd");
        buf.clear();
        assert_eq!(
            read_bounded_line(&mut reader, &mut buf, 4).await.unwrap(),
            LineRead::Overflow
        );
        buf.clear();
        assert_eq!(
            read_bounded_line(&mut reader, &mut buf, 4).await.unwrap(),
            LineRead::Eof
        );
    }
}
