//! Notes operations.
//!
//! [`NotesService`] is the single entry point shared by the CLI and the MCP
//! tools. Every operation validates and escapes all of its inputs before
//! generating a script, so a rejected argument never reaches the
//! interpreter. Bodies are rendered from markdown on the way in and
//! extracted back to markdown on the way out.

use notesmith_core::{
    EscapedLiteral, MarkdownText, RawText, prepare_body, prepare_title, prepare_title_field,
    read_body,
};
use tracing::{debug, info};

use crate::error::Result;
use crate::script::{Script, ScriptRunner, output_lines, templates};

/// Notes operations backed by a [`ScriptRunner`].
#[derive(Debug)]
pub struct NotesService<R> {
    runner: R,
    default_folder: String,
}

impl<R: ScriptRunner> NotesService<R> {
    /// Creates a service; notes created without a folder go to
    /// `default_folder`.
    pub fn new(runner: R, default_folder: impl Into<String>) -> Self {
        Self {
            runner,
            default_folder: default_folder.into(),
        }
    }

    /// Returns the underlying runner.
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Returns the folder used when none is given.
    pub fn default_folder(&self) -> &str {
        &self.default_folder
    }

    /// Lists folder names.
    ///
    /// # Errors
    ///
    /// Returns a script error if the interpreter fails.
    pub async fn list_folders(&self) -> Result<Vec<String>> {
        let output = self.run(templates::list_folders()).await?;
        Ok(output_lines(&output))
    }

    /// Creates a folder and returns the name Notes reports for it.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad name, or a script error if the
    /// interpreter fails.
    pub async fn create_folder(&self, name: &RawText) -> Result<String> {
        let name = prepare_title_field(name, "name")?;
        let created = self.run(templates::create_folder(&name)).await?;
        info!(folder = %created, "created folder");
        Ok(created)
    }

    /// Lists note titles in `folder`, or in every folder when it is missing.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad folder name, or a script error
    /// if the interpreter fails.
    pub async fn list_notes(&self, folder: &RawText) -> Result<Vec<String>> {
        let folder = optional_folder(folder)?;
        let output = self.run(templates::list_notes(folder.as_ref())).await?;
        Ok(output_lines(&output))
    }

    /// Lists titles of notes whose title or body contains `query`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank or overlong query, or a script
    /// error if the interpreter fails.
    pub async fn search_notes(&self, query: &RawText) -> Result<Vec<String>> {
        let query = prepare_title_field(query, "query")?;
        let output = self.run(templates::search_notes(&query)).await?;
        Ok(output_lines(&output))
    }

    /// Fetches a note and returns its body as markdown.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad title or folder, or a script
    /// error if the interpreter fails (including when the note does not
    /// exist).
    pub async fn show_note(&self, title: &RawText, folder: &RawText) -> Result<MarkdownText> {
        let title = prepare_title(title)?;
        let folder = optional_folder(folder)?;
        let html = self
            .run(templates::show_note(&title, folder.as_ref()))
            .await?;
        Ok(read_body(&html))
    }

    /// Creates a note from a markdown body and returns its title.
    ///
    /// # Errors
    ///
    /// Returns the first validation error (title, then body, then folder),
    /// or a script error if the interpreter fails.
    pub async fn create_note(
        &self,
        title: &RawText,
        body: &RawText,
        folder: &RawText,
    ) -> Result<String> {
        let title = prepare_title(title)?;
        let body = prepare_body(body)?;
        let folder = match optional_folder(folder)? {
            Some(folder) => folder,
            None => self.default_folder_literal()?,
        };
        let created = self
            .run(templates::create_note(&title, &body, &folder))
            .await?;
        info!(note = %created, "created note");
        Ok(created)
    }

    /// Replaces a note's body, optionally renaming it, and returns its
    /// final title.
    ///
    /// # Errors
    ///
    /// Returns the first validation error, or a script error if the
    /// interpreter fails.
    pub async fn update_note(
        &self,
        title: &RawText,
        body: &RawText,
        new_title: &RawText,
        folder: &RawText,
    ) -> Result<String> {
        let title = prepare_title(title)?;
        let body = prepare_body(body)?;
        let new_title = match new_title {
            RawText::Missing => None,
            other => Some(prepare_title_field(other, "new_title")?),
        };
        let folder = optional_folder(folder)?;
        let updated = self
            .run(templates::update_note(
                &title,
                &body,
                new_title.as_ref(),
                folder.as_ref(),
            ))
            .await?;
        info!(note = %updated, "updated note");
        Ok(updated)
    }

    /// Deletes a note.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad title or folder, or a script
    /// error if the interpreter fails.
    pub async fn delete_note(&self, title: &RawText, folder: &RawText) -> Result<()> {
        let title = prepare_title(title)?;
        let folder = optional_folder(folder)?;
        self.run(templates::delete_note(&title, folder.as_ref()))
            .await?;
        info!("deleted note");
        Ok(())
    }

    fn default_folder_literal(&self) -> Result<EscapedLiteral> {
        let folder = RawText::from(self.default_folder.as_str());
        Ok(prepare_title_field(&folder, "default_folder")?)
    }

    async fn run(&self, script: Script) -> Result<String> {
        debug!(script = script.name(), "dispatching script");
        Ok(self.runner.run(&script).await?)
    }
}

/// Folder names are optional; when present they follow title rules.
fn optional_folder(folder: &RawText) -> Result<Option<EscapedLiteral>> {
    match folder {
        RawText::Missing => Ok(None),
        other => Ok(Some(prepare_title_field(other, "folder")?)),
    }
}
