//! HTML to markdown extraction.
//!
//! Recovers markdown from a stored Notes body. Notes rewrites the HTML it is
//! given, so the extractor accepts the loose subset the host produces (and
//! the renderer emits) rather than well-formed documents. Unknown tags are
//! stripped and their text kept.
//!
//! Inline conversions run before block conversions so list items and
//! paragraphs already hold markdown when they are flattened. Entities are
//! decoded last, in one pass, so `&amp;lt;` yields `&lt;` and never `<`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::rule::{Rule, RuleChain};
use crate::text::MarkdownText;

static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<li\b[^>]*>(.*?)</li\s*>").expect("valid regex"));

static CODE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?(?:code|tt)\b[^>]*>").expect("valid regex"));

static EXTRACT_RULES: LazyLock<RuleChain> = LazyLock::new(|| {
    RuleChain::new(vec![
        Rule::replace("comments", r"(?s)<!--.*?-->", ""),
        Rule::replace_with("headings", r"(?is)<h([1-6])\b[^>]*>(.*?)</h[1-6]\s*>", heading),
        Rule::replace_with(
            "bold",
            r"(?is)<(?:strong|b)\b[^>]*>(.*?)</(?:strong|b)\s*>",
            |caps| emphasis(&caps[1], "**"),
        ),
        Rule::replace_with(
            "italic",
            r"(?is)<(?:em|i)\b[^>]*>(.*?)</(?:em|i)\s*>",
            |caps| emphasis(&caps[1], "*"),
        ),
        Rule::replace_with(
            "monospace-blockquote",
            r#"(?is)<blockquote\b[^>]*\bstyle\s*=\s*["'][^"']*monospace[^"']*["'][^>]*>(.*?)</blockquote\s*>"#,
            |caps| fence(&caps[1]),
        ),
        Rule::replace_with("preformatted", r"(?is)<pre\b[^>]*>(.*?)</pre\s*>", |caps| {
            fence(&CODE_TAG_RE.replace_all(&caps[1], ""))
        }),
        Rule::replace(
            "inline-code",
            r"(?is)<(?:code|tt)\b[^>]*>(.*?)</(?:code|tt)\s*>",
            "`${1}`",
        ),
        Rule::replace_with("unordered-list", r"(?is)<ul\b[^>]*>(.*?)</ul\s*>", |caps| {
            list_items(&caps[1], |_| "-".to_owned())
        }),
        Rule::replace_with("ordered-list", r"(?is)<ol\b[^>]*>(.*?)</ol\s*>", |caps| {
            list_items(&caps[1], |n| format!("{n}."))
        }),
        Rule::replace("horizontal-rule", r"(?i)<hr\b[^>]*>", "\n\n---\n\n"),
        Rule::replace("line-break", r"(?i)<br\b[^>]*>", "\n"),
        Rule::replace("paragraph", r"(?is)<p\b[^>]*>(.*?)</p\s*>", "${1}\n\n"),
        Rule::replace("div-open", r"(?i)<div\b[^>]*>", ""),
        Rule::replace("div-close", r"(?i)</div\s*>", "\n"),
        Rule::replace(
            "link",
            r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a\s*>"#,
            "[${2}](${1})",
        ),
        Rule::replace("strip-tags", r"</?[A-Za-z][^>]*>", ""),
        Rule::replace_with(
            "decode-entities",
            r"&(nbsp|amp|lt|gt|quot|apos|#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6});",
            decode_entity,
        ),
        Rule::replace("trim-line-ends", r"[ \t]+\n", "\n"),
        Rule::replace("collapse-newlines", r"\n{3,}", "\n\n"),
        Rule::transform("trim", |s| s.trim().to_owned()),
    ])
});

/// Returns the extractor's rule chain.
#[must_use]
pub fn rules() -> &'static RuleChain {
    &EXTRACT_RULES
}

/// Extracts markdown from a stored HTML body.
#[must_use]
pub fn extract(html: &str) -> MarkdownText {
    if html.is_empty() {
        return MarkdownText::default();
    }
    MarkdownText::new(EXTRACT_RULES.apply(html))
}

/// Like [`extract`], treating an absent body as empty.
#[must_use]
pub fn extract_optional(html: Option<&str>) -> MarkdownText {
    html.map_or_else(MarkdownText::default, extract)
}

fn heading(caps: &Captures<'_>) -> String {
    let level: usize = caps[1].parse().unwrap_or(1);
    format!("\n{} {}\n\n", "#".repeat(level), caps[2].trim())
}

/// Wraps `inner` in `delimiter`, keeping padding outside the delimiters.
///
/// `* x*` at the start of a line reads as a list item, so `<em> x</em>`
/// must become ` *x*`. A span holding only padding loses its delimiters.
fn emphasis(inner: &str, delimiter: &str) -> String {
    let rest = trim_padding_start(inner);
    let core = trim_padding_end(rest);
    if core.is_empty() {
        return inner.to_owned();
    }
    let lead = &inner[..inner.len() - rest.len()];
    let trail = &rest[core.len()..];
    format!("{lead}{delimiter}{core}{delimiter}{trail}")
}

fn trim_padding_start(mut text: &str) -> &str {
    loop {
        let trimmed = text.trim_start();
        let trimmed = trimmed.strip_prefix("&nbsp;").unwrap_or(trimmed);
        if trimmed.len() == text.len() {
            return text;
        }
        text = trimmed;
    }
}

fn trim_padding_end(mut text: &str) -> &str {
    loop {
        let trimmed = text.trim_end();
        let trimmed = trimmed.strip_suffix("&nbsp;").unwrap_or(trimmed);
        if trimmed.len() == text.len() {
            return text;
        }
        text = trimmed;
    }
}

fn fence(code: &str) -> String {
    format!("\n```\n{}\n```\n", code.trim_matches('\n'))
}

fn list_items(inner: &str, marker: fn(usize) -> String) -> String {
    let mut out = String::from("\n");
    for (i, item) in LIST_ITEM_RE.captures_iter(inner).enumerate() {
        out.push_str(&marker(i + 1));
        out.push(' ');
        out.push_str(item[1].trim());
        out.push('\n');
    }
    out.push('\n');
    out
}

fn decode_entity(caps: &Captures<'_>) -> String {
    let name = &caps[1];
    let decoded = match name {
        "nbsp" => Some(' '),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => name.strip_prefix('#').and_then(|num| {
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => num.parse().ok(),
            };
            code.and_then(char::from_u32)
        }),
    };
    decoded.map_or_else(|| caps[0].to_owned(), String::from)
}
