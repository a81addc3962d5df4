//! Stage composition for write and read operations.
//!
//! Write: raw input → [`validate`] → [`render`] (bodies only) → [`escape`].
//! Read: stored HTML → [`extract`].

use crate::error::ValidationError;
use crate::escape::escape;
use crate::extract::extract;
use crate::render::render;
use crate::text::{EscapedLiteral, MarkdownText, RawText, TextKind};
use crate::validate::{validate, validate_field};

/// A validated, rendered, and escaped note, ready for a script template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedNote {
    /// Escaped title.
    pub title: EscapedLiteral,
    /// Escaped HTML body.
    pub body: EscapedLiteral,
}

/// Validates and escapes a title.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the title is missing, not text, blank,
/// or too long.
pub fn prepare_title(raw: &RawText) -> Result<EscapedLiteral, ValidationError> {
    prepare_title_field(raw, TextKind::Title.as_str())
}

/// Validates and escapes a title-like value (folder name, search query),
/// reporting failures against `field`.
///
/// # Errors
///
/// Same as [`prepare_title`].
pub fn prepare_title_field(
    raw: &RawText,
    field: &'static str,
) -> Result<EscapedLiteral, ValidationError> {
    let title = validate_field(raw, TextKind::Title, field)?;
    Ok(escape(title.as_str()))
}

/// Validates a markdown body, renders it to sanitized HTML, and escapes the
/// HTML.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidType`] if the body is missing or not
/// text.
pub fn prepare_body(raw: &RawText) -> Result<EscapedLiteral, ValidationError> {
    let body = validate(raw, TextKind::Body)?;
    let html = render(&MarkdownText::from(body));
    Ok(escape(html.as_str()))
}

/// Prepares a title and body together.
///
/// # Errors
///
/// Returns the first [`ValidationError`], title before body.
pub fn prepare_note(title: &RawText, body: &RawText) -> Result<PreparedNote, ValidationError> {
    Ok(PreparedNote {
        title: prepare_title(title)?,
        body: prepare_body(body)?,
    })
}

/// Converts a stored HTML body back to markdown.
#[must_use]
pub fn read_body(html: &str) -> MarkdownText {
    extract(html)
}
