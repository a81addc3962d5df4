//! Text-transformation core for notesmith.
//!
//! Converts between the markdown callers write and the HTML Apple Notes
//! stores, and encodes untrusted text for embedding in generated
//! AppleScript:
//!
//! - [`validate`](validate::validate) rejects malformed titles and bodies
//! - [`escape`](escape::escape) produces script string literals
//! - [`sanitize`](sanitize::sanitize) removes a fixed denylist of HTML
//! - [`render`](render::render) turns markdown into styled, sanitized HTML
//! - [`extract`](extract::extract) turns stored HTML back into markdown
//!
//! Every stage is a pure function over a stage-tagged type from [`text`].
//! Only validation can fail.

pub mod error;
pub mod escape;
pub mod extract;
pub mod pipeline;
pub mod render;
pub mod rule;
pub mod sanitize;
pub mod text;
pub mod validate;

pub use error::ValidationError;
pub use escape::{escape, escape_raw};
pub use extract::{extract, extract_optional};
pub use pipeline::{
    PreparedNote, prepare_body, prepare_note, prepare_title, prepare_title_field, read_body,
};
pub use render::render;
pub use rule::{Rule, RuleChain};
pub use sanitize::sanitize;
pub use text::{EscapedLiteral, MarkdownText, RawText, SanitizedHtml, TextKind, ValidatedText};
pub use validate::{validate, validate_field};
