//! `notesmith` - Apple Notes from the command line and over MCP

use std::sync::{Arc, OnceLock};

use clap::Parser;
use tokio_util::sync::CancellationToken;

use notesmith::cli::args::Cli;
use notesmith::cli::commands;
use notesmith::error::ExitCode;
use notesmith::observability::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    let cancel = CancellationToken::new();
    let signalled: Arc<OnceLock<i32>> = Arc::new(OnceLock::new());

    // First signal cancels the running command; a second one forces exit.
    {
        let cancel = cancel.clone();
        let signalled = Arc::clone(&signalled);
        tokio::spawn(async move {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to register SIGTERM handler");

            let code = tokio::select! {
                _ = tokio::signal::ctrl_c() => ExitCode::INTERRUPTED,
                _ = sigterm.recv() => ExitCode::TERMINATED,
            };
            let _ = signalled.set(code);

            eprintln!("\nShutting down... (press Ctrl+C again to force)");
            cancel.cancel();

            tokio::select! {
                _ = tokio::signal::ctrl_c() => std::process::exit(ExitCode::INTERRUPTED),
                _ = sigterm.recv() => std::process::exit(ExitCode::TERMINATED),
            }
        });
    }

    let result = commands::dispatch(cli, cancel).await;

    match result {
        Ok(()) => std::process::exit(signalled.get().copied().unwrap_or(ExitCode::SUCCESS)),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
