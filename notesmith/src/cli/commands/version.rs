//! `version` command

use serde_json::{Value, json};

use crate::cli::args::{OutputFormat, VersionArgs};
use crate::handlers::initialize::{PROTOCOL_VERSION, SERVER_NAME};

/// Prints the package version and the MCP protocol revision served.
pub fn run(args: &VersionArgs) {
    match args.format {
        OutputFormat::Human => println!("{}", human_line()),
        OutputFormat::Json => println!("{}", version_info()),
    }
}

fn human_line() -> String {
    format!(
        "{SERVER_NAME} {} (MCP {PROTOCOL_VERSION})",
        env!("CARGO_PKG_VERSION")
    )
}

fn version_info() -> Value {
    json!({
        "name": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "protocolVersion": PROTOCOL_VERSION,
    })
}
