//! `serve` command: MCP server on stdio

use tokio_util::sync::CancellationToken;

use crate::cli::args::RunnerArgs;
use crate::error::NotesmithError;
use crate::server::Server;
use crate::transport::StdioTransport;

/// Serves MCP over stdin/stdout until the client disconnects or `cancel`
/// fires.
///
/// # Errors
///
/// Returns an error if the interpreter configuration is invalid or the
/// transport fails.
pub async fn run(runner: &RunnerArgs, cancel: CancellationToken) -> Result<(), NotesmithError> {
    let service = super::build_service(runner)?;
    let transport = StdioTransport::new();
    tracing::info!(
        max_message_size = transport.config().max_message_size,
        default_folder = %runner.default_folder,
        "starting MCP server on stdio"
    );
    Server::new(service, Box::new(transport), cancel).run().await
}
