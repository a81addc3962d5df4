//! CLI argument definitions
//!
//! All Clap derive structs for `notesmith` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::{
    DEFAULT_FOLDER, DEFAULT_INTERPRETER, DEFAULT_MAX_OUTPUT, RunnerConfig,
};
use crate::error::NotesmithError;
use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Write Apple Notes in markdown, from the shell or an MCP client.
#[derive(Parser, Debug)]
#[command(name = "notesmith", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "NOTESMITH_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "NOTESMITH_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Script interpreter settings.
    #[command(flatten)]
    pub runner: RunnerArgs,
}

/// Interpreter settings shared by every command that talks to Notes.
#[derive(Args, Debug, Clone)]
pub struct RunnerArgs {
    /// Interpreter command line; the script is written to its stdin.
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_INTERPRETER,
        env = "NOTESMITH_INTERPRETER"
    )]
    pub interpreter: String,

    /// Time limit for a single script run (e.g. `30s`, `2m`).
    #[arg(
        long,
        global = true,
        default_value = "30s",
        value_parser = humantime::parse_duration,
        env = "NOTESMITH_TIMEOUT"
    )]
    pub timeout: Duration,

    /// Maximum interpreter output in bytes.
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_MAX_OUTPUT,
        env = "NOTESMITH_MAX_OUTPUT"
    )]
    pub max_output: usize,

    /// Folder for new notes when none is given.
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_FOLDER,
        env = "NOTESMITH_FOLDER"
    )]
    pub default_folder: String,
}

impl RunnerArgs {
    /// Resolves the arguments into a [`RunnerConfig`].
    ///
    /// # Errors
    ///
    /// Returns a usage error if the interpreter command line is invalid.
    pub fn runner_config(&self) -> Result<RunnerConfig, NotesmithError> {
        RunnerConfig::from_command_line(&self.interpreter, self.timeout, self.max_output)
    }
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Notes(NotesCommand),

    /// Render markdown to sanitized HTML without touching Notes.
    Render(ConvertArgs),

    /// Extract markdown from HTML without touching Notes.
    Extract(ConvertArgs),

    /// Escape text as a script string literal.
    Escape(EscapeArgs),

    /// Serve the notes tools over MCP on stdio.
    Serve,

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Subcommands that run a script against Notes.
#[derive(Subcommand, Debug)]
pub enum NotesCommand {
    /// List folder names.
    Folders(FoldersArgs),

    /// Create a folder.
    FolderCreate(FolderCreateArgs),

    /// List note titles in a folder, or in every folder.
    List(ListArgs),

    /// Find notes whose title or body contains a query.
    Search(SearchArgs),

    /// Print a note's body as markdown.
    Show(NoteArgs),

    /// Create a note from markdown.
    Create(CreateArgs),

    /// Replace a note's body, optionally renaming it.
    Update(UpdateArgs),

    /// Delete a note.
    Delete(NoteArgs),
}

// ============================================================================
// Notes Commands
// ============================================================================

/// Arguments for `folders`.
#[derive(Args, Debug)]
pub struct FoldersArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `folder-create`.
#[derive(Args, Debug)]
pub struct FolderCreateArgs {
    /// Folder name.
    pub name: String,
}

/// Arguments for `list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list notes in this folder.
    #[arg(long)]
    pub folder: Option<String>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `search`.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Text to look for in titles and bodies.
    pub query: String,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for commands addressing one note.
#[derive(Args, Debug)]
pub struct NoteArgs {
    /// Note title.
    pub title: String,

    /// Folder holding the note.
    #[arg(long)]
    pub folder: Option<String>,
}

/// Arguments for `create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Note title.
    pub title: String,

    /// Markdown body source.
    #[command(flatten)]
    pub body: BodyArgs,

    /// Folder to create the note in (defaults to `--default-folder`).
    #[arg(long)]
    pub folder: Option<String>,
}

/// Arguments for `update`.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Current note title.
    pub title: String,

    /// Markdown body source.
    #[command(flatten)]
    pub body: BodyArgs,

    /// New title for the note.
    #[arg(long)]
    pub rename: Option<String>,

    /// Folder holding the note.
    #[arg(long)]
    pub folder: Option<String>,
}

/// Where a markdown body comes from.
#[derive(Args, Debug, Default)]
#[group(multiple = false)]
pub struct BodyArgs {
    /// Markdown body text.
    #[arg(long)]
    pub body: Option<String>,

    /// Read the markdown body from a file (`-` for stdin).
    #[arg(long, value_name = "PATH")]
    pub body_file: Option<PathBuf>,
}

// ============================================================================
// Offline Commands
// ============================================================================

/// Arguments for `render` and `extract`.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input file (`-` or omitted for stdin).
    pub input: Option<PathBuf>,
}

/// Arguments for `escape`.
#[derive(Args, Debug)]
pub struct EscapeArgs {
    /// Input file (`-` or omitted for stdin).
    pub input: Option<PathBuf>,

    /// Wrap the output in double quotes.
    #[arg(long)]
    pub quoted: bool,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
