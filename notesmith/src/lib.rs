//! `notesmith` - Apple Notes from the command line and over MCP
//!
//! Notes are written in markdown, stored as sanitized HTML, and reached
//! through generated AppleScript run by an external interpreter. The same
//! [`notes::NotesService`] backs the CLI subcommands and the MCP tools.

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod notes;
pub mod observability;
pub mod script;
pub mod server;
pub mod transport;
