//! Notes command handlers
//!
//! Implements `folders`, `folder-create`, `list`, `search`, `show`,
//! `create`, `update`, and `delete`.

use notesmith_core::RawText;

use crate::cli::args::{BodyArgs, NotesCommand, OutputFormat};
use crate::error::NotesmithError;
use crate::notes::NotesService;
use crate::script::ScriptRunner;

use super::read_input;

/// Runs one notes subcommand and prints its result to stdout.
///
/// # Errors
///
/// Returns a validation, usage, I/O, or script error from the operation.
pub async fn run<R: ScriptRunner>(
    command: NotesCommand,
    service: &NotesService<R>,
) -> Result<(), NotesmithError> {
    match command {
        NotesCommand::Folders(args) => {
            let folders = service.list_folders().await?;
            print_names(&folders, args.format)
        }
        NotesCommand::FolderCreate(args) => {
            let name = service.create_folder(&RawText::from(args.name)).await?;
            println!("{name}");
            Ok(())
        }
        NotesCommand::List(args) => {
            let notes = service.list_notes(&RawText::from(args.folder)).await?;
            print_names(&notes, args.format)
        }
        NotesCommand::Search(args) => {
            let notes = service.search_notes(&RawText::from(args.query)).await?;
            print_names(&notes, args.format)
        }
        NotesCommand::Show(args) => {
            let body = service
                .show_note(&RawText::from(args.title), &RawText::from(args.folder))
                .await?;
            println!("{body}");
            Ok(())
        }
        NotesCommand::Create(args) => {
            let body = read_body(&args.body).await?.unwrap_or_default();
            let title = service
                .create_note(
                    &RawText::from(args.title),
                    &RawText::from(body),
                    &RawText::from(args.folder),
                )
                .await?;
            println!("{title}");
            Ok(())
        }
        NotesCommand::Update(args) => {
            let Some(body) = read_body(&args.body).await? else {
                return Err(NotesmithError::Usage(
                    "update requires --body or --body-file".to_string(),
                ));
            };
            let title = service
                .update_note(
                    &RawText::from(args.title),
                    &RawText::from(body),
                    &RawText::from(args.rename),
                    &RawText::from(args.folder),
                )
                .await?;
            println!("{title}");
            Ok(())
        }
        NotesCommand::Delete(args) => {
            service
                .delete_note(&RawText::from(args.title), &RawText::from(args.folder))
                .await?;
            Ok(())
        }
    }
}

/// Resolves `--body` / `--body-file` to the body text, if either was given.
async fn read_body(args: &BodyArgs) -> Result<Option<String>, NotesmithError> {
    if let Some(body) = &args.body {
        return Ok(Some(body.clone()));
    }
    match &args.body_file {
        Some(path) => Ok(Some(read_input(Some(path)).await?)),
        None => Ok(None),
    }
}

fn print_names(names: &[String], format: OutputFormat) -> Result<(), NotesmithError> {
    match format {
        OutputFormat::Human => {
            for name in names {
                println!("{name}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(names)?),
    }
    Ok(())
}
