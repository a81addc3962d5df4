//! Script string-literal escaping.
//!
//! Turns arbitrary untrusted text into a string that can sit between the
//! double quotes of an AppleScript string literal without terminating the
//! literal, the enclosing `tell` block, or a `{...}` properties record.
//!
//! # Rule order
//!
//! 1. `neutralize-block-keywords`: `end tell` → `end_tell`, `tell` → `tell_`
//!    (whole word, case-insensitive, letter case kept)
//! 2. `strip-control-chars`: U+0000–U+0008, U+000B, U+000C, U+000E–U+001F, U+007F
//! 3. `strip-line-separators`: U+0085, U+2028, U+2029
//! 4. `strip-invisible-chars`: zero-width and bidi control code points
//! 5. `escape-backslashes`: `\` → `\\`
//! 6. `escape-quotes`: `"` → `\"`
//! 7. `normalize-newlines`: CRLF / CR / LF → `\n`
//! 8. `escape-tabs`: TAB → `\t`
//! 9. `blank-page-breaks`: FF / VT → space
//! 10. `strip-braces`: `{` and `}` removed
//! 11. `re-neutralize-block-keywords`: steps 2–4 and 10 delete characters
//!     and can splice a keyword back together
//! 12. `truncate`: cap at [`MAX_LITERAL_CHARS`] and append [`TRUNCATION_MARKER`];
//!     the body never exceeds the cap, even when a keyword sits at the cut
//!
//! Keyword neutralization runs before character escaping because it matches
//! on word boundaries. Backslashes are escaped before quotes, otherwise the
//! backslash added in front of a quote would itself be doubled.

use std::sync::LazyLock;

use regex::Regex;

use crate::rule::{Rule, RuleChain};
use crate::text::{EscapedLiteral, RawText};

/// Maximum literal length in characters, excluding the truncation marker.
pub const MAX_LITERAL_CHARS: usize = 50_000;

/// Appended to a literal that was cut at [`MAX_LITERAL_CHARS`].
pub const TRUNCATION_MARKER: &str = "... [truncated]";

static BLOCK_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(end)\s+(tell)\b").expect("valid regex"));

static BLOCK_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(tell)\b").expect("valid regex"));

static ESCAPE_RULES: LazyLock<RuleChain> = LazyLock::new(|| {
    RuleChain::new(vec![
        Rule::transform("neutralize-block-keywords", neutralize_keywords),
        Rule::transform("strip-control-chars", strip_control_chars),
        Rule::transform("strip-line-separators", strip_line_separators),
        Rule::transform("strip-invisible-chars", strip_invisible_chars),
        Rule::transform("escape-backslashes", |s| s.replace('\\', "\\\\")),
        Rule::transform("escape-quotes", |s| s.replace('"', "\\\"")),
        Rule::transform("normalize-newlines", |s| {
            s.replace("\r\n", "\\n").replace(['\r', '\n'], "\\n")
        }),
        Rule::transform("escape-tabs", |s| s.replace('\t', "\\t")),
        Rule::transform("blank-page-breaks", |s| s.replace(['\u{0B}', '\u{0C}'], " ")),
        Rule::transform("strip-braces", |s| s.replace(['{', '}'], "")),
        Rule::transform("re-neutralize-block-keywords", neutralize_keywords),
        Rule::transform("truncate", truncate_literal),
    ])
});

/// Returns the escaper's rule chain.
#[must_use]
pub fn rules() -> &'static RuleChain {
    &ESCAPE_RULES
}

/// Escapes `text` for embedding in a double-quoted script literal.
///
/// Never fails; empty input yields an empty literal.
#[must_use]
pub fn escape(text: &str) -> EscapedLiteral {
    if text.is_empty() {
        return EscapedLiteral::default();
    }
    EscapedLiteral::new(ESCAPE_RULES.apply(text))
}

/// Escapes unvalidated input. Missing and non-text values yield an empty
/// literal.
#[must_use]
pub fn escape_raw(raw: &RawText) -> EscapedLiteral {
    raw.as_text().map_or_else(EscapedLiteral::default, escape)
}

/// Rewrites the block keywords to a non-keyword spelling.
///
/// `end tell` is handled first so its `tell` is not rewritten on its own;
/// the underscore in `end_tell` and `tell_` removes the word boundary the
/// second pattern needs, which makes the rewrite idempotent.
fn neutralize_keywords(text: &str) -> String {
    let text = BLOCK_END_RE.replace_all(text, "${1}_${2}");
    BLOCK_START_RE.replace_all(&text, "${1}_").into_owned()
}

const fn is_disallowed_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}

const fn is_line_separator(c: char) -> bool {
    matches!(c, '\u{85}' | '\u{2028}' | '\u{2029}')
}

const fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}' | '\u{2066}'..='\u{2069}' | '\u{FEFF}'
    )
}

fn strip_control_chars(text: &str) -> String {
    text.chars().filter(|&c| !is_disallowed_control(c)).collect()
}

fn strip_line_separators(text: &str) -> String {
    text.chars().filter(|&c| !is_line_separator(c)).collect()
}

fn strip_invisible_chars(text: &str) -> String {
    text.chars().filter(|&c| !is_invisible(c)).collect()
}

/// Cuts an over-long literal.
///
/// A cut can split an escape sequence and leave a lone trailing backslash,
/// which would escape the closing quote of the literal; it is dropped. A
/// cut can also shear the `_` off `tell_`. Neutralizing the exposed keyword
/// again would push the body past the limit, so the cut moves back instead
/// until the neutralized body fits.
fn truncate_literal(text: &str) -> String {
    if text.char_indices().nth(MAX_LITERAL_CHARS).is_none() {
        return text.to_owned();
    }

    let mut limit = MAX_LITERAL_CHARS;
    loop {
        let mut cut = neutralize_keywords(without_dangling_backslash(prefix_chars(text, limit)));
        if limit == 0 || cut.chars().count() <= MAX_LITERAL_CHARS {
            cut.push_str(TRUNCATION_MARKER);
            return cut;
        }
        limit -= 1;
    }
}

fn prefix_chars(text: &str, n: usize) -> &str {
    text.char_indices().nth(n).map_or(text, |(at, _)| &text[..at])
}

fn without_dangling_backslash(text: &str) -> &str {
    let trailing = text.chars().rev().take_while(|&c| c == '\\').count();
    if trailing % 2 == 1 {
        &text[..text.len() - 1]
    } else {
        text
    }
}
