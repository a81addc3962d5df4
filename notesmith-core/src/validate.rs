//! Input validation.
//!
//! Rejects malformed titles and bodies before any transformation runs.

use crate::error::ValidationError;
use crate::text::{RawText, TextKind, ValidatedText};

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 255;

/// Validates caller input for use as `kind`.
///
/// The field name in errors is the kind's name (`"title"` or `"body"`).
///
/// # Errors
///
/// - [`ValidationError::InvalidType`] if the input is missing or not text.
/// - [`ValidationError::EmptyInput`] if a title is blank after trimming.
/// - [`ValidationError::TooLong`] if a title exceeds [`MAX_TITLE_CHARS`].
pub fn validate(raw: &RawText, kind: TextKind) -> Result<ValidatedText, ValidationError> {
    validate_field(raw, kind, kind.as_str())
}

/// Validates caller input for use as `kind`, reporting failures against
/// `field`.
///
/// Folder names and search queries are validated as titles under their own
/// field names.
///
/// # Errors
///
/// Same as [`validate`].
pub fn validate_field(
    raw: &RawText,
    kind: TextKind,
    field: &'static str,
) -> Result<ValidatedText, ValidationError> {
    let Some(text) = raw.as_text() else {
        return Err(ValidationError::InvalidType {
            field,
            found: raw.type_name(),
        });
    };

    let trimmed = text.trim();

    if kind == TextKind::Title {
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyInput { field });
        }
        let length = trimmed.chars().count();
        if length > MAX_TITLE_CHARS {
            return Err(ValidationError::TooLong {
                field,
                length,
                limit: MAX_TITLE_CHARS,
            });
        }
    }

    Ok(ValidatedText::new(kind, trimmed.to_owned()))
}
