//! MCP server runtime.
//!
//! The [`Server`] reads requests from a [`Transport`], dispatches them to
//! the handlers, and writes one response per request, sequentially, until
//! end of input or cancellation.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::NotesmithError;
use crate::handlers;
use crate::notes::NotesService;
use crate::script::ScriptRunner;
use crate::transport::Transport;
use crate::transport::jsonrpc::{
    JSONRPC_VERSION, JsonRpcMessage, JsonRpcRequest, JsonRpcResponse, error_codes,
};

/// MCP server over a single transport.
pub struct Server<R> {
    service: NotesService<R>,
    transport: Box<dyn Transport>,
    cancel: CancellationToken,
}

impl<R: ScriptRunner> Server<R> {
    /// Creates a server; cancelling `cancel` stops it after the current
    /// request is abandoned.
    pub fn new(
        service: NotesService<R>,
        transport: Box<dyn Transport>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            service,
            transport,
            cancel,
        }
    }

    /// Runs until the client closes its input or the token is cancelled.
    ///
    /// # Errors
    ///
    /// Returns a transport error if reading or writing a frame fails.
    pub async fn run(&self) -> Result<(), NotesmithError> {
        info!("server started");
        let result = self.main_loop().await;
        match &result {
            Ok(()) => info!("server stopped"),
            Err(e) => warn!(error = %e, "server stopped with error"),
        }
        result
    }

    async fn main_loop(&self) -> Result<(), NotesmithError> {
        loop {
            let message = tokio::select! {
                () = self.cancel.cancelled() => {
                    info!("server cancelled");
                    return Ok(());
                }
                msg = self.transport.receive_message() => msg?,
            };

            let Some(message) = message else {
                debug!("transport EOF, shutting down");
                return Ok(());
            };

            if message.version() != JSONRPC_VERSION {
                warn!(
                    version = message.version(),
                    expected = JSONRPC_VERSION,
                    "invalid JSON-RPC version"
                );
            }

            let request = match message {
                JsonRpcMessage::Request(req) => req,
                JsonRpcMessage::Response(_) => {
                    debug!("ignoring incoming response");
                    continue;
                }
                JsonRpcMessage::Notification(notif) => {
                    debug!(method = %notif.method, "ignoring incoming notification");
                    continue;
                }
            };

            debug!(method = %request.method, id = %request.id, "request received");

            // Dropping the handler future kills a running interpreter.
            let response = tokio::select! {
                () = self.cancel.cancelled() => {
                    info!(method = %request.method, "server cancelled during request");
                    return Ok(());
                }
                response = handlers::handle_request(&request, &self.service) => response,
            };

            let response = response.unwrap_or_else(|| method_not_found(&request));
            self.transport.send_message(&response.into()).await?;
        }
    }
}

fn method_not_found(request: &JsonRpcRequest) -> JsonRpcResponse {
    debug!(method = %request.method, "unknown method");
    JsonRpcResponse::error(
        request.id.clone(),
        error_codes::METHOD_NOT_FOUND,
        format!("method not found: {}", request.method),
    )
}
