//! Denylist HTML sanitizer.
//!
//! Removes a fixed set of dangerous constructs from an HTML fragment:
//!
//! - the elements in [`DENYLISTED_TAGS`], open tag through close tag
//! - stray or unterminated open/close tags of those elements
//! - `on<word>="..."` / `on<word>='...'` event-handler attributes
//! - unquoted `on<word>=value` attributes inside a tag
//! - the `javascript:` scheme token
//!
//! Sanitizing is subtractive and best-effort: the rest of the fragment is
//! passed through untouched, well-formed or not, and nothing is ever
//! rejected.
//!
//! Paired elements go first, one regex rule per tag. Everything else is
//! removed by a single left-to-right scan that deletes from its output
//! buffer, so a token spliced together by a removal
//! (`<scr<script></script>ipt>`, `javajavascript:script:`) is caught as soon
//! as its last character is appended. No match ever ends inside the scan's
//! output, so nesting depth does not add passes and the cost stays linear.
//! The chain is still re-applied until the text stops changing; the second
//! pass finds nothing, and sanitizing twice is the same as sanitizing once.

use std::sync::LazyLock;

use crate::rule::{Rule, RuleChain};
use crate::text::SanitizedHtml;

/// Element names removed by the sanitizer.
pub const DENYLISTED_TAGS: [&str; 5] = ["script", "iframe", "object", "embed", "form"];

const SCRIPT_SCHEME: &str = "javascript";

static SANITIZE_RULES: LazyLock<RuleChain> = LazyLock::new(|| {
    RuleChain::new(vec![
        Rule::replace("script-element", r"(?is)<script\b[^>]*>.*?</script\s*>", ""),
        Rule::replace("iframe-element", r"(?is)<iframe\b[^>]*>.*?</iframe\s*>", ""),
        Rule::replace("object-element", r"(?is)<object\b[^>]*>.*?</object\s*>", ""),
        Rule::replace("embed-element", r"(?is)<embed\b[^>]*>.*?</embed\s*>", ""),
        Rule::replace("form-element", r"(?is)<form\b[^>]*>.*?</form\s*>", ""),
        Rule::transform("denylisted-tokens", strip_denylisted_tokens),
    ])
});

/// Returns the sanitizer's rule chain.
#[must_use]
pub fn rules() -> &'static RuleChain {
    &SANITIZE_RULES
}

/// Removes denylisted tags, event-handler attributes, and `javascript:`
/// schemes from `html`.
#[must_use]
pub fn sanitize(html: &str) -> SanitizedHtml {
    SanitizedHtml::new(SANITIZE_RULES.apply_until_stable(html))
}

/// Removes every denylisted token left outside a paired element.
///
/// A removed tag also takes the rest of its markup up to the next `>`,
/// unless a `<` comes first.
fn strip_denylisted_tokens(html: &str) -> String {
    let input: Vec<char> = html.chars().collect();
    let mut scan = TokenScan::new();
    // Lookups only move forward, so one cached answer covers every query
    // up to it.
    let mut next_angle: Option<usize> = None;

    let mut i = 0;
    while let Some(&c) = input.get(i) {
        i += 1;
        if ends_value(c) {
            while scan.strip_unquoted_handler() {}
        }
        let removed = match c {
            ':' => scan.strip_scheme(),
            '"' | '\'' => scan.strip_quoted_handler(c),
            _ => false,
        };
        if removed {
            continue;
        }

        scan.push(c);
        if scan.strip_tag() {
            let at = match next_angle {
                Some(at) if at >= i => at,
                _ => {
                    let at = input[i..]
                        .iter()
                        .position(|&next| next == '<' || next == '>')
                        .map_or(input.len(), |offset| i + offset);
                    next_angle = Some(at);
                    at
                }
            };
            if input.get(at) == Some(&'>') {
                i = at + 1;
            }
        }
    }
    while scan.strip_unquoted_handler() {}

    scan.out.into_iter().collect()
}

/// Characters that end an unquoted attribute value.
fn ends_value(c: char) -> bool {
    c.is_whitespace() || matches!(c, '>' | '"' | '\'')
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '/'
}

fn ends_with_ignore_case(chars: &[char], word: &str) -> bool {
    chars.len().checked_sub(word.len()).is_some_and(|at| {
        chars[at..]
            .iter()
            .zip(word.chars())
            .all(|(a, b)| a.eq_ignore_ascii_case(&b))
    })
}

fn last_before(marks: &[usize], end: usize) -> Option<usize> {
    let count = marks.partition_point(|&at| at < end);
    count.checked_sub(1).and_then(|k| marks.get(k)).copied()
}

fn truncate_marks(marks: &mut Vec<usize>, len: usize) {
    let keep = marks.partition_point(|&at| at < len);
    marks.truncate(keep);
}

/// Start positions of maximal runs of one character class in the output.
struct Runs {
    class: fn(char) -> bool,
    starts: Vec<usize>,
}

impl Runs {
    const fn new(class: fn(char) -> bool) -> Self {
        Self {
            class,
            starts: Vec::new(),
        }
    }

    fn pushed(&mut self, out: &[char]) {
        let Some((&last, rest)) = out.split_last() else {
            return;
        };
        if (self.class)(last) && !rest.last().is_some_and(|&c| (self.class)(c)) {
            self.starts.push(rest.len());
        }
    }

    fn truncate(&mut self, len: usize) {
        truncate_marks(&mut self.starts, len);
    }

    /// Start of the run ending just before `end`, or `end` when
    /// `out[end - 1]` is outside the class.
    fn start_before(&self, out: &[char], end: usize) -> usize {
        let in_run = end
            .checked_sub(1)
            .and_then(|last| out.get(last))
            .is_some_and(|&c| (self.class)(c));
        if !in_run {
            return end;
        }
        last_before(&self.starts, end).unwrap_or(end)
    }
}

/// Output buffer of [`strip_denylisted_tokens`] with the positions its
/// checks look up.
struct TokenScan {
    out: Vec<char>,
    spaces: Runs,
    words: Runs,
    separators: Runs,
    values: Runs,
    angles: Vec<usize>,
    double_quotes: Vec<usize>,
    single_quotes: Vec<usize>,
    /// `=` of an unquoted handler candidate, with the start of its removal.
    handler_equals: Vec<(usize, usize)>,
}

impl TokenScan {
    fn new() -> Self {
        Self {
            out: Vec::new(),
            spaces: Runs::new(char::is_whitespace),
            words: Runs::new(is_word),
            separators: Runs::new(is_separator),
            values: Runs::new(|c| !ends_value(c)),
            angles: Vec::new(),
            double_quotes: Vec::new(),
            single_quotes: Vec::new(),
            handler_equals: Vec::new(),
        }
    }

    fn push(&mut self, c: char) {
        let at = self.out.len();
        match c {
            '=' => {
                if let Some(start) = self.unquoted_handler_start(at) {
                    self.handler_equals.push((at, start));
                }
            }
            '<' | '>' => self.angles.push(at),
            '"' => self.double_quotes.push(at),
            '\'' => self.single_quotes.push(at),
            _ => {}
        }
        self.out.push(c);
        self.spaces.pushed(&self.out);
        self.words.pushed(&self.out);
        self.separators.pushed(&self.out);
        self.values.pushed(&self.out);
    }

    fn truncate(&mut self, len: usize) {
        self.out.truncate(len);
        self.spaces.truncate(len);
        self.words.truncate(len);
        self.separators.truncate(len);
        self.values.truncate(len);
        for marks in [
            &mut self.angles,
            &mut self.double_quotes,
            &mut self.single_quotes,
        ] {
            truncate_marks(marks, len);
        }
        let keep = self.handler_equals.partition_point(|&(eq, _)| eq < len);
        self.handler_equals.truncate(keep);
    }

    /// Start of an `on<word>` name before the `=` at `eq`, skipping spaces.
    fn handler_name_before(&self, eq: usize) -> Option<usize> {
        let name_end = self.spaces.start_before(&self.out, eq);
        let name_start = self.words.start_before(&self.out, name_end);
        match self.out.get(name_start..name_end)? {
            [o, n, _, ..] if o.eq_ignore_ascii_case(&'o') && n.eq_ignore_ascii_case(&'n') => {
                Some(name_start)
            }
            _ => None,
        }
    }

    /// Removal start for an unquoted handler whose `=` sits at `eq`: the
    /// separators before its name, provided they are inside a tag.
    fn unquoted_handler_start(&self, eq: usize) -> Option<usize> {
        let name_start = self.handler_name_before(eq)?;
        let start = self.separators.start_before(&self.out, name_start);
        if start == name_start {
            return None;
        }
        let angle = last_before(&self.angles, start)?;
        (self.out.get(angle) == Some(&'<')).then_some(start)
    }

    /// Removes a denylisted open or close tag ending the output.
    fn strip_tag(&mut self) -> bool {
        for name in DENYLISTED_TAGS {
            if !ends_with_ignore_case(&self.out, name) {
                continue;
            }
            let name_start = self.out.len() - name.len();
            let start = match self.out[..name_start] {
                [.., '<', '/'] => name_start - 2,
                [.., '<'] => name_start - 1,
                _ => continue,
            };
            self.truncate(start);
            return true;
        }
        false
    }

    /// Removes `javascript` and trailing spaces when a `:` arrives.
    fn strip_scheme(&mut self) -> bool {
        let end = self.spaces.start_before(&self.out, self.out.len());
        if !ends_with_ignore_case(&self.out[..end], SCRIPT_SCHEME) {
            return false;
        }
        self.truncate(end - SCRIPT_SCHEME.len());
        true
    }

    /// Removes a quoted handler when its closing `quote` arrives.
    fn strip_quoted_handler(&mut self, quote: char) -> bool {
        let opening = if quote == '"' {
            self.double_quotes.last()
        } else {
            self.single_quotes.last()
        };
        let Some(&opening) = opening else {
            return false;
        };
        let Some(eq) = self.spaces.start_before(&self.out, opening).checked_sub(1) else {
            return false;
        };
        if self.out.get(eq) != Some(&'=') {
            return false;
        }
        let Some(name_start) = self.handler_name_before(eq) else {
            return false;
        };
        let start = self.spaces.start_before(&self.out, name_start);
        self.truncate(start);
        true
    }

    /// Removes an unquoted handler whose value ends the output.
    fn strip_unquoted_handler(&mut self) -> bool {
        let end = self.out.len();
        let value_start = self.values.start_before(&self.out, end);
        if value_start == end {
            return false;
        }
        // The `=` either sits right before the spaces ahead of the value
        // run, or inside the run itself.
        let gap = self.spaces.start_before(&self.out, value_start);
        let first = self.handler_equals.partition_point(|&(eq, _)| eq + 1 < gap);
        match self.handler_equals.get(first) {
            Some(&(eq, start)) if eq + 1 < end => {
                self.truncate(start);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn clean(html: &str) -> String {
        sanitize(html).into_string()
    }

    #[test]
    fn rule_order_is_fixed() {
        let names: Vec<_> = rules().names().collect();
        assert_eq!(
            names,
            [
                "script-element",
                "iframe-element",
                "object-element",
                "embed-element",
                "form-element",
                "denylisted-tokens",
            ]
        );
    }

    #[test]
    fn safe_markup_is_untouched() {
        let html = r#"<div style="color: red"><p>Hello <b>world</b></p></div>"#;
        assert_eq!(clean(html), html);
    }

    #[test]
    fn script_element_is_removed_with_content() {
        assert_eq!(clean("a<script>alert(1)</script>b"), "ab");
    }

    #[test]
    fn removal_is_case_insensitive_and_multiline() {
        assert_eq!(clean("a<SCRIPT type=\"x\">\nalert(1)\n</ScRiPt >b"), "ab");
    }

    #[test]
    fn removal_is_non_greedy() {
        assert_eq!(
            clean("<script>1</script>keep<script>2</script>"),
            "keep"
        );
    }

    #[test]
    fn every_denylisted_element_is_removed() {
        for tag in DENYLISTED_TAGS {
            let html = format!("x<{tag} a=\"1\">inner</{tag}>y");
            assert_eq!(clean(&html), "xy", "tag {tag}");
        }
    }

    #[test]
    fn unterminated_script_tag_is_removed() {
        assert_eq!(clean("before<script src=x"), "before src=x");
        assert_eq!(clean("before<script>after"), "beforeafter");
    }

    #[test]
    fn self_closing_embed_is_removed() {
        assert_eq!(clean(r#"<p>a</p><embed src="x.swf"/>"#), "<p>a</p>");
    }

    #[test]
    fn double_quoted_event_handler_is_removed() {
        assert_eq!(
            clean(r#"<img src="a.png" onerror="alert(1)">"#),
            r#"<img src="a.png">"#
        );
    }

    #[test]
    fn single_quoted_event_handler_is_removed() {
        assert_eq!(
            clean("<div onClick='go()'>x</div>"),
            "<div>x</div>"
        );
    }

    #[test]
    fn unquoted_event_handler_is_removed() {
        assert_eq!(clean("<img src=x onerror=alert(1)>"), "<img src=x>");
        assert_eq!(clean("<svg/onload=alert(1)>"), "<svg>");
    }

    #[test]
    fn plain_text_with_equals_is_untouched() {
        assert_eq!(clean("one = two"), "one = two");
    }

    #[test]
    fn javascript_scheme_is_removed() {
        assert_eq!(
            clean(r#"<a href="JavaScript:alert(1)">x</a>"#),
            r#"<a href="alert(1)">x</a>"#
        );
    }

    #[test]
    fn spliced_tokens_are_removed() {
        assert_eq!(clean("<scr<script></script>ipt>alert(1)</script>"), "alert(1)");
        assert_eq!(clean("javajavascript:script:alert(1)"), "alert(1)");
    }

    #[test]
    fn deeply_nested_scheme_is_removed_in_one_scan() {
        let depth = 9_000;
        let html = format!("{}{}", "java".repeat(depth), "script:".repeat(depth));
        assert!(html.len() > 95_000);
        let started = Instant::now();
        assert_eq!(clean(&html), "");
        let elapsed = started.elapsed();
        assert!(elapsed < Duration::from_secs(1), "took {elapsed:?}");
    }

    #[test]
    fn deeply_nested_tags_are_removed() {
        let depth = 5_000;
        let html = format!("{}<script{}", "<scr".repeat(depth), "ipt".repeat(depth));
        let started = Instant::now();
        assert_eq!(clean(&html), "");
        let elapsed = started.elapsed();
        assert!(elapsed < Duration::from_secs(1), "took {elapsed:?}");
    }

    #[test]
    fn deeply_nested_quoted_handlers_are_removed() {
        let depth = 5_000;
        let html = format!(
            "<a{} onx=\"1\"{}>",
            " on".repeat(depth),
            "x=\"2\"".repeat(depth)
        );
        assert_eq!(clean(&html), "<a>");
        assert_eq!(clean(r#"<a on onx="1"x="2">"#), "<a>");
    }

    #[test]
    fn tag_spliced_by_handler_removal_is_removed() {
        assert_eq!(clean(r#"<scr onx="1"ipt>alert(1)"#), "alert(1)");
        assert_eq!(clean("<a href=javascript<script>:go()>x</a>"), "<a href=go()>x</a>");
    }

    #[test]
    fn handler_value_may_contain_angle_open() {
        assert_eq!(clean("<a onx=1<b>x"), "<a>x");
    }

    #[test]
    fn several_unquoted_handlers_in_one_tag() {
        assert_eq!(clean("<a ony=1/onx=2 title=t>"), "<a title=t>");
        assert_eq!(clean("<a onz= 3 onx=2>"), "<a>");
    }

    #[test]
    fn unquoted_handler_outside_tag_is_kept() {
        assert_eq!(clean("onion=3 and x > onion=4"), "onion=3 and x > onion=4");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = [
            "<scr<script></script>ipt>x",
            r#"<a href="javajavascript::script:x" onclick="y">z</a>"#,
            "<form><input></form>",
            "plain",
        ];
        for input in inputs {
            let once = clean(input);
            assert_eq!(clean(&once), once, "input {input}");
        }
    }

    #[test]
    fn malformed_markup_passes_through() {
        assert_eq!(clean("<p>unclosed <b>bold"), "<p>unclosed <b>bold");
        assert_eq!(clean("a < b > c"), "a < b > c");
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(sanitize("").is_empty());
    }
}
