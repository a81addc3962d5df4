//! MCP `initialize` handler.

use serde_json::json;

use crate::transport::jsonrpc::{JsonRpcRequest, JsonRpcResponse};

/// MCP protocol version we advertise.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "notesmith";

/// Handles an `initialize` request.
///
/// The server only offers tools; the client's requested protocol version is
/// logged and answered with [`PROTOCOL_VERSION`].
#[must_use]
pub fn handle(request: &JsonRpcRequest) -> JsonRpcResponse {
    let params = request.params.as_ref();
    let client = params
        .and_then(|p| p.pointer("/clientInfo/name"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<unknown>");
    let requested = params
        .and_then(|p| p.get("protocolVersion"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<none>");
    tracing::info!(client, requested, "client initializing");

    JsonRpcResponse::success(
        request.id.clone(),
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            }
        }),
    )
}
