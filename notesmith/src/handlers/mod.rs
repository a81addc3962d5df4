//! MCP request handler dispatch.
//!
//! Routes incoming JSON-RPC requests to a handler by method name.

pub mod initialize;
pub mod tools;

use serde_json::json;

use crate::notes::NotesService;
use crate::script::ScriptRunner;
use crate::transport::jsonrpc::{JsonRpcRequest, JsonRpcResponse};

/// Dispatches an MCP request to the appropriate handler.
///
/// Returns `None` for methods this server does not implement; the caller
/// answers those with `METHOD_NOT_FOUND`. Tool failures are reported inside
/// a successful response, so this never fails.
pub async fn handle_request<R: ScriptRunner>(
    request: &JsonRpcRequest,
    service: &NotesService<R>,
) -> Option<JsonRpcResponse> {
    match request.method.as_str() {
        "initialize" => Some(initialize::handle(request)),
        "ping" => Some(JsonRpcResponse::success(request.id.clone(), json!({}))),
        "tools/list" => Some(tools::handle_list(request)),
        "tools/call" => Some(tools::handle_call(request, service).await),
        _ => None,
    }
}
