//! Offline conversion commands
//!
//! `render`, `extract`, and `escape` run a single pipeline stage on a file
//! or stdin and print the result. No interpreter is involved.

use notesmith_core::{
    MarkdownText, escape as escape_literal, extract as extract_markdown, render as render_html,
};

use crate::cli::args::{ConvertArgs, EscapeArgs};
use crate::error::NotesmithError;

use super::read_input;

/// Render markdown to sanitized HTML.
///
/// # Errors
///
/// Returns an I/O error if the input cannot be read.
pub async fn render(args: &ConvertArgs) -> Result<(), NotesmithError> {
    let markdown = read_input(args.input.as_deref()).await?;
    let html = render_html(&MarkdownText::new(markdown));
    tracing::debug!(bytes = html.len(), "rendered markdown");
    println!("{html}");
    Ok(())
}

/// Extract markdown from HTML.
///
/// # Errors
///
/// Returns an I/O error if the input cannot be read.
pub async fn extract(args: &ConvertArgs) -> Result<(), NotesmithError> {
    let html = read_input(args.input.as_deref()).await?;
    println!("{}", extract_markdown(&html));
    Ok(())
}

/// Escape text as a script string literal.
///
/// One trailing line ending is dropped first, so `echo text | notesmith
/// escape` does not produce a literal ending in `\n`.
///
/// # Errors
///
/// Returns an I/O error if the input cannot be read.
pub async fn escape(args: &EscapeArgs) -> Result<(), NotesmithError> {
    let text = read_input(args.input.as_deref()).await?;
    let literal = escape_literal(strip_line_ending(&text));
    if args.quoted {
        println!("{}", literal.quoted());
    } else {
        println!("{literal}");
    }
    Ok(())
}

fn strip_line_ending(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_single_line_ending() {
        assert_eq!(strip_line_ending("a\n"), "a");
        assert_eq!(strip_line_ending("a\r\n"), "a");
        assert_eq!(strip_line_ending("a\n\n"), "a\n");
        assert_eq!(strip_line_ending("a"), "a");
    }

    #[tokio::test]
    async fn test_render_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");
        std::fs::write(&path, "# Title").unwrap();
        let args = ConvertArgs { input: Some(path) };
        render(&args).await.unwrap();
    }

    #[tokio::test]
    async fn test_extract_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = ConvertArgs {
            input: Some(dir.path().join("missing.html")),
        };
        let err = extract(&args).await.unwrap_err();
        assert!(matches!(err, NotesmithError::Io(_)));
    }
}
