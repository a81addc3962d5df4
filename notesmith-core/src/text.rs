//! Stage-tagged text values.
//!
//! Every value flowing through the conversion pipeline is wrapped in a type
//! naming the stage that produced it. [`SanitizedHtml`] and
//! [`EscapedLiteral`] have no public constructor: the only way to obtain one
//! is to run the sanitizer/renderer or the escaper, so a string can only
//! reach a script template after it has been escaped.

use std::fmt;

use serde::Serialize;

// ============================================================================
// TextKind
// ============================================================================

/// What a piece of caller input is used for.
///
/// Titles are strictly validated (non-empty, bounded length); bodies are
/// only trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    /// A note title, folder name, or search query.
    Title,
    /// A note body.
    Body,
}

impl TextKind {
    /// Returns the lowercase name used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for TextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RawText
// ============================================================================

/// Unvalidated caller input.
///
/// Input arrives from the command line (always text) or from MCP tool
/// arguments, where a field may be absent or hold a non-string JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawText {
    /// The value was not supplied (or was JSON `null`).
    Missing,
    /// A text value.
    Text(String),
    /// A value of some other type; holds the type name for diagnostics.
    NonText(&'static str),
}

impl RawText {
    /// Returns the name of the value's type, as reported in errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Missing => "null",
            Self::Text(_) => "string",
            Self::NonText(name) => *name,
        }
    }

    /// Returns the text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Missing | Self::NonText(_) => None,
        }
    }
}

impl From<&str> for RawText {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for RawText {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Option<&str>> for RawText {
    fn from(text: Option<&str>) -> Self {
        text.map_or(Self::Missing, Self::from)
    }
}

impl From<Option<String>> for RawText {
    fn from(text: Option<String>) -> Self {
        text.map_or(Self::Missing, Self::Text)
    }
}

impl From<&serde_json::Value> for RawText {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Missing,
            Value::String(s) => Self::Text(s.clone()),
            Value::Bool(_) => Self::NonText("boolean"),
            Value::Number(_) => Self::NonText("number"),
            Value::Array(_) => Self::NonText("array"),
            Value::Object(_) => Self::NonText("object"),
        }
    }
}

impl From<Option<&serde_json::Value>> for RawText {
    fn from(value: Option<&serde_json::Value>) -> Self {
        value.map_or(Self::Missing, Self::from)
    }
}

// ============================================================================
// ValidatedText
// ============================================================================

/// Input that passed [`validate`](crate::validate::validate): present,
/// textual, and trimmed. Titles are additionally non-empty and at most
/// [`MAX_TITLE_CHARS`](crate::validate::MAX_TITLE_CHARS) long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedText {
    kind: TextKind,
    text: String,
}

impl ValidatedText {
    pub(crate) const fn new(kind: TextKind, text: String) -> Self {
        Self { kind, text }
    }

    /// Returns what the text was validated as.
    #[must_use]
    pub const fn kind(&self) -> TextKind {
        self.kind
    }

    /// Returns the validated text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consumes the value, returning the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

impl AsRef<str> for ValidatedText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for ValidatedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ============================================================================
// MarkdownText
// ============================================================================

/// Text in the supported markdown dialect.
///
/// Carries no structural guarantee; anything may be treated as markdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MarkdownText(String);

impl MarkdownText {
    /// Wraps a string as markdown.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the markdown source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the markdown is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the value, returning the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for MarkdownText {
    fn from(text: &str) -> Self {
        Self(text.to_owned())
    }
}

impl From<String> for MarkdownText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<ValidatedText> for MarkdownText {
    fn from(text: ValidatedText) -> Self {
        Self(text.into_string())
    }
}

impl AsRef<str> for MarkdownText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarkdownText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SanitizedHtml
// ============================================================================

/// An HTML fragment with every denylisted construct removed.
///
/// Produced only by [`sanitize`](crate::sanitize::sanitize) and
/// [`render`](crate::render::render).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SanitizedHtml(String);

impl SanitizedHtml {
    pub(crate) const fn new(html: String) -> Self {
        Self(html)
    }

    /// Returns the HTML fragment.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the fragment length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the fragment is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the value, returning the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for SanitizedHtml {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SanitizedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// EscapedLiteral
// ============================================================================

/// Text that is safe to place between the double quotes of a script
/// string literal.
///
/// Produced only by [`escape`](crate::escape::escape).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EscapedLiteral(String);

impl EscapedLiteral {
    pub(crate) const fn new(text: String) -> Self {
        Self(text)
    }

    /// Returns the escaped text, without surrounding quotes.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the escaped text wrapped in double quotes, ready to splice
    /// into script source.
    #[must_use]
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }

    /// Returns the length in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Returns `true` if the literal is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for EscapedLiteral {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EscapedLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_text_from_json_string() {
        assert_eq!(RawText::from(&json!("hi")), RawText::Text("hi".to_string()));
    }

    #[test]
    fn raw_text_from_json_null_is_missing() {
        assert_eq!(RawText::from(&json!(null)), RawText::Missing);
        assert_eq!(RawText::from(None::<&serde_json::Value>), RawText::Missing);
    }

    #[test]
    fn raw_text_from_json_non_string() {
        assert_eq!(RawText::from(&json!(42)).type_name(), "number");
        assert_eq!(RawText::from(&json!(true)).type_name(), "boolean");
        assert_eq!(RawText::from(&json!([1])).type_name(), "array");
        assert_eq!(RawText::from(&json!({"a": 1})).type_name(), "object");
    }

    #[test]
    fn raw_text_from_option() {
        assert_eq!(RawText::from(None::<&str>), RawText::Missing);
        assert_eq!(RawText::from(Some("x")).as_text(), Some("x"));
    }

    #[test]
    fn text_kind_display() {
        assert_eq!(TextKind::Title.to_string(), "title");
        assert_eq!(TextKind::Body.to_string(), "body");
    }

    #[test]
    fn escaped_literal_quoted() {
        let lit = EscapedLiteral::new("a \\\"b\\\"".to_string());
        assert_eq!(lit.quoted(), "\"a \\\"b\\\"\"");
    }

    #[test]
    fn markdown_serializes_transparently() {
        let md = MarkdownText::from("# Title");
        assert_eq!(serde_json::to_value(&md).unwrap(), json!("# Title"));
    }
}
