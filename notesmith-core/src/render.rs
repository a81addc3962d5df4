//! Markdown to HTML rendering.
//!
//! Renders the supported markdown dialect into an inline-styled HTML
//! fragment for a Notes body. The input is sanitized first, then rewritten
//! by a fixed chain of rules:
//!
//! 1. fenced code blocks → monospace `<blockquote>`
//! 2. inline code spans → `<code>`
//! 3. `###`, `##`, `#` headings (longest prefix first)
//! 4. runs of `- ` / `* ` lines → `<ul>`
//! 5. runs of `N. ` lines → `<ol>`
//! 6. `**bold**` → `<strong>`
//! 7. `*italic*` → `<em>` (after bold, or `**` would be read as two italics)
//! 8. a line of three or more hyphens → `<hr>`
//! 9. blank-line blocks → `<p>`, single newlines → `<br>`
//! 10. one styled `<div>` container around everything
//!
//! Block rules run before the inline and paragraph rules: once a heading,
//! list, or code block has been rewritten it sits on a single line, so the
//! paragraph rule can treat each such line as an opaque block.
//!
//! Code content is entity-encoded (including `*` and `` ` ``) and its
//! newlines become `<br>`, which keeps every later rule away from it.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::rule::{Rule, RuleChain};
use crate::sanitize::sanitize;
use crate::text::{MarkdownText, SanitizedHtml};

const CONTAINER_STYLE: &str =
    "font-family: -apple-system, Helvetica Neue, Helvetica, Arial, sans-serif; font-size: 14px; line-height: 1.5;";
const CODE_BLOCK_STYLE: &str = "font-family: Menlo, Monaco, Courier, monospace; font-size: 13px; background-color: #f5f5f5; border-left: 3px solid #cccccc; padding: 8px 12px; margin: 8px 0; white-space: pre-wrap;";
const INLINE_CODE_STYLE: &str = "font-family: Menlo, Monaco, Courier, monospace; font-size: 13px; background-color: #f0f0f0; padding: 1px 4px; border-radius: 3px;";
const H1_STYLE: &str = "font-size: 24px; font-weight: bold; margin: 16px 0 8px 0;";
const H2_STYLE: &str = "font-size: 20px; font-weight: bold; margin: 14px 0 6px 0;";
const H3_STYLE: &str = "font-size: 17px; font-weight: bold; margin: 12px 0 4px 0;";
const LIST_STYLE: &str = "margin: 8px 0; padding-left: 24px;";
const RULE_STYLE: &str = "border: none; border-top: 1px solid #cccccc; margin: 16px 0;";

static UNORDERED_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[*-][ \t]+").expect("valid regex"));

static ORDERED_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.[ \t]+").expect("valid regex"));

static BLANK_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("valid regex"));

static BLOCK_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*<(?:h[1-6]|ul|ol|li|blockquote|pre|hr|div|p|table)\b")
        .expect("valid regex")
});

static RENDER_RULES: LazyLock<RuleChain> = LazyLock::new(|| {
    RuleChain::new(vec![
        Rule::replace_with("code-block", r"(?s)```(?:[^\n`]*\n)?(.*?)```", code_block),
        Rule::replace_with("inline-code", r"`([^`\n]+)`", inline_code),
        Rule::replace_with("heading-3", r"(?m)^###[ \t]+(.+?)[ \t]*$", |caps| {
            format!("<h3 style=\"{H3_STYLE}\">{}</h3>", &caps[1])
        }),
        Rule::replace_with("heading-2", r"(?m)^##[ \t]+(.+?)[ \t]*$", |caps| {
            format!("<h2 style=\"{H2_STYLE}\">{}</h2>", &caps[1])
        }),
        Rule::replace_with("heading-1", r"(?m)^#[ \t]+(.+?)[ \t]*$", |caps| {
            format!("<h1 style=\"{H1_STYLE}\">{}</h1>", &caps[1])
        }),
        Rule::replace_with(
            "unordered-list",
            r"(?m)^(?:[*-][ \t]+[^\n]*(?:\n|\z))+",
            |caps| list("ul", &caps[0], &UNORDERED_MARKER_RE),
        ),
        Rule::replace_with(
            "ordered-list",
            r"(?m)^(?:\d+\.[ \t]+[^\n]*(?:\n|\z))+",
            |caps| list("ol", &caps[0], &ORDERED_MARKER_RE),
        ),
        Rule::replace("bold", r"\*\*([^*]+?)\*\*", "<strong>${1}</strong>"),
        Rule::replace("italic", r"\*([^*\n]+?)\*", "<em>${1}</em>"),
        Rule::replace_with("horizontal-rule", r"(?m)^-{3,}[ \t]*$", |_| {
            format!("<hr style=\"{RULE_STYLE}\">")
        }),
        Rule::transform("paragraphs", paragraphs),
        Rule::transform("container", |s| {
            format!("<div style=\"{CONTAINER_STYLE}\">{s}</div>")
        }),
    ])
});

/// Returns the renderer's rule chain.
#[must_use]
pub fn rules() -> &'static RuleChain {
    &RENDER_RULES
}

/// Renders `markdown` to a sanitized, inline-styled HTML fragment.
///
/// Line endings are normalized to `\n` and the input is sanitized before
/// any rule runs; the finished fragment is sanitized again so the result
/// upholds the [`SanitizedHtml`] guarantee whatever the rules produced.
#[must_use]
pub fn render(markdown: &MarkdownText) -> SanitizedHtml {
    let normalized = markdown.as_str().replace("\r\n", "\n").replace('\r', "\n");
    let clean = sanitize(&normalized);
    let html = RENDER_RULES.apply(clean.as_str());
    sanitize(&html)
}

/// Encodes code content so no later rule (or the host) interprets it.
fn encode_code(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    for c in code.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '*' => out.push_str("&#42;"),
            '`' => out.push_str("&#96;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(c),
        }
    }
    out
}

fn code_block(caps: &Captures<'_>) -> String {
    let code = caps[1].strip_suffix('\n').unwrap_or(&caps[1]);
    format!(
        "<blockquote style=\"{CODE_BLOCK_STYLE}\">{}</blockquote>",
        encode_code(code)
    )
}

fn inline_code(caps: &Captures<'_>) -> String {
    format!(
        "<code style=\"{INLINE_CODE_STYLE}\">{}</code>",
        encode_code(&caps[1])
    )
}

/// Turns a run of marker lines into one list element on a single line.
fn list(tag: &str, run: &str, marker: &Regex) -> String {
    let items: String = run
        .lines()
        .map(|line| format!("<li>{}</li>", marker.replace(line, "").trim_end()))
        .collect();
    let trailing = if run.ends_with('\n') { "\n" } else { "" };
    format!("<{tag} style=\"{LIST_STYLE}\">{items}</{tag}>{trailing}")
}

/// Splits the text into blank-line separated blocks. Lines already holding a
/// block element are kept as they are; runs of other lines become a
/// paragraph with `<br>` between lines.
fn paragraphs(text: &str) -> String {
    fn flush(out: &mut String, pending: &mut Vec<&str>) {
        if !pending.is_empty() {
            out.push_str("<p>");
            out.push_str(&pending.join("<br>"));
            out.push_str("</p>");
            pending.clear();
        }
    }

    let mut out = String::with_capacity(text.len() + 64);
    for block in BLANK_LINE_RE.split(text) {
        let mut pending: Vec<&str> = Vec::new();
        for line in block.lines() {
            if BLOCK_LINE_RE.is_match(line) {
                flush(&mut out, &mut pending);
                out.push_str(line.trim());
            } else if !line.trim().is_empty() {
                pending.push(line);
            }
        }
        flush(&mut out, &mut pending);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(markdown: &str) -> String {
        render(&MarkdownText::from(markdown)).into_string()
    }

    /// Applies a single named rule, bypassing the rest of the chain.
    fn apply_rule(name: &str, text: &str) -> String {
        rules()
            .get(name)
            .unwrap_or_else(|| panic!("no rule named {name}"))
            .apply(text)
            .into_owned()
    }

    #[test]
    fn rule_order_is_fixed() {
        let names: Vec<_> = rules().names().collect();
        assert_eq!(
            names,
            [
                "code-block",
                "inline-code",
                "heading-3",
                "heading-2",
                "heading-1",
                "unordered-list",
                "ordered-list",
                "bold",
                "italic",
                "horizontal-rule",
                "paragraphs",
                "container",
            ]
        );
    }

    #[test]
    fn heading_one() {
        let out = html("# Heading 1");
        assert!(out.contains("<h1"));
        assert!(out.contains(">Heading 1</h1>"));
    }

    #[test]
    fn heading_levels_are_not_confused() {
        let out = html("### Three\n## Two\n# One");
        assert!(out.contains(">Three</h3>"));
        assert!(out.contains(">Two</h2>"));
        assert!(out.contains(">One</h1>"));
        assert!(!out.contains("# "));
    }

    #[test]
    fn hash_without_space_is_not_a_heading() {
        let out = html("#hashtag");
        assert!(!out.contains("<h1"));
        assert!(out.contains("#hashtag"));
    }

    #[test]
    fn bold_text() {
        assert!(html("**bold text**").contains("<strong>bold text</strong>"));
    }

    #[test]
    fn italic_text() {
        assert!(html("*soft*").contains("<em>soft</em>"));
    }

    #[test]
    fn bold_runs_before_italic() {
        let out = html("**a** and *b*");
        assert!(out.contains("<strong>a</strong> and <em>b</em>"));
        assert!(!out.contains("<em>*"));
    }

    #[test]
    fn inline_code() {
        let out = html("`code`");
        assert!(out.contains("<code"));
        assert!(out.contains(">code</code>"));
    }

    #[test]
    fn inline_code_content_is_not_formatted() {
        let out = html("`**not bold**`");
        assert!(!out.contains("<strong>"));
        assert!(out.contains("&#42;&#42;not bold&#42;&#42;"));
    }

    #[test]
    fn fenced_code_block() {
        let out = html("```rust\nfn main() {\n    let x = a < b;\n}\n```");
        assert!(out.contains("<blockquote style=\""));
        assert!(out.contains("monospace"));
        assert!(out.contains("fn main() {<br>    let x = a &lt; b;<br>}</blockquote>"));
        assert!(!out.contains("rust"));
    }

    #[test]
    fn code_block_content_is_not_formatted() {
        let out = html("```\n# not a heading\n- not a list\n*x*\n```");
        assert!(!out.contains("<h1"));
        assert!(!out.contains("<ul"));
        assert!(!out.contains("<em>"));
    }

    #[test]
    fn unordered_list() {
        let out = html("- Item 1\n* Item 2\n- Item 3");
        assert!(out.contains("<li>Item 1</li><li>Item 2</li><li>Item 3</li></ul>"));
        assert_eq!(out.matches("<ul").count(), 1);
    }

    #[test]
    fn separated_lists_are_separate() {
        let out = html("- a\n\n- b");
        assert_eq!(out.matches("<ul").count(), 2);
    }

    #[test]
    fn ordered_list() {
        let out = html("1. First\n2. Second\n10. Tenth");
        assert!(out.contains("<ol"));
        assert!(out.contains("<li>First</li><li>Second</li><li>Tenth</li></ol>"));
    }

    #[test]
    fn list_item_formatting_is_applied() {
        let out = html("- **bold** item");
        assert!(out.contains("<li><strong>bold</strong> item</li>"));
    }

    #[test]
    fn horizontal_rule() {
        let out = html("above\n\n---\n\nbelow");
        assert!(out.contains("<hr style=\""));
        assert!(out.contains("<p>above</p>"));
        assert!(out.contains("<p>below</p>"));
    }

    #[test]
    fn paragraphs_and_line_breaks() {
        let out = html("line one\nline two\n\nnext paragraph");
        assert!(out.contains("<p>line one<br>line two</p><p>next paragraph</p>"));
    }

    #[test]
    fn block_lines_are_not_wrapped_in_paragraphs() {
        let out = html("# Title\ntext");
        assert!(out.contains("</h1><p>text</p>"));
        assert!(!out.contains("<p><h1"));
    }

    #[test]
    fn output_is_wrapped_in_container() {
        let out = html("x");
        assert!(out.starts_with("<div style=\""));
        assert!(out.contains("line-height"));
        assert!(out.ends_with("</div>"));
    }

    #[test]
    fn crlf_input_is_normalized() {
        let out = html("# Title\r\n\r\nbody");
        assert!(out.contains(">Title</h1>"));
        assert!(out.contains("<p>body</p>"));
        assert!(!out.contains('\r'));
    }

    #[test]
    fn raw_script_is_removed_before_rendering() {
        let out = html("hello <script>alert(1)</script> **world**");
        assert!(!out.to_lowercase().contains("<script"));
        assert!(out.contains("<strong>world</strong>"));
    }

    #[test]
    fn event_handler_in_markdown_is_removed() {
        let out = html(r#"<img src="x" onerror="alert(1)"> text"#);
        assert!(!out.contains("onerror"));
    }

    #[test]
    fn empty_markdown_renders_empty_container() {
        assert_eq!(html(""), format!("<div style=\"{CONTAINER_STYLE}\"></div>"));
    }

    #[test]
    fn heading_rule_alone() {
        assert_eq!(
            apply_rule("heading-2", "## Sub  "),
            format!("<h2 style=\"{H2_STYLE}\">Sub</h2>")
        );
    }

    #[test]
    fn italic_rule_does_not_cross_lines() {
        assert_eq!(apply_rule("italic", "*a\nb*"), "*a\nb*");
    }

    #[test]
    fn flat_list_flattens_indented_lines() {
        // Indented lines are not list items; nesting is not supported.
        let out = html("- a\n  - b");
        assert_eq!(out.matches("<li>").count(), 1);
    }
}
