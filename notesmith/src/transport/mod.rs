//! MCP transport.
//!
//! The [`Transport`] trait carries JSON-RPC messages between the server
//! loop and a client. [`StdioTransport`] speaks newline-delimited JSON over
//! stdin/stdout.

pub mod jsonrpc;
pub mod stdio;

pub use jsonrpc::{
    JSONRPC_VERSION, JsonRpcError, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, error_codes,
};
pub use stdio::{StdioConfig, StdioTransport};

use crate::error::TransportError;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Default maximum message size in bytes (10 MB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Default buffer size for the stdio transport (64 KB).
pub const DEFAULT_STDIO_BUFFER_SIZE: usize = 64 * 1024;

/// Sends and receives framed JSON-RPC messages.
///
/// Methods take `&self`; implementations guard their streams with
/// `tokio::sync::Mutex` so a transport can be shared.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Serializes and sends one message.
    async fn send_message(&self, message: &JsonRpcMessage) -> Result<()>;

    /// Receives the next well-formed message.
    ///
    /// Returns `Ok(None)` at end of input. Malformed input is skipped, not
    /// returned as an error.
    async fn receive_message(&self) -> Result<Option<JsonRpcMessage>>;
}
