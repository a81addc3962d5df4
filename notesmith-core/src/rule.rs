//! Named, ordered rewrite rules.
//!
//! The escaper, sanitizer, renderer, and extractor are each a [`RuleChain`]:
//! a fixed sequence of [`Rule`]s applied one after another, every rule
//! scanning the whole output of the previous one. Rule order is part of each
//! component's contract, so chains expose their rule names for inspection.

use std::borrow::Cow;
use std::fmt;

use regex::{Captures, Regex};

/// How a regex rule produces replacement text for a match.
pub enum Rewrite {
    /// A `regex` replacement template (`${1}` style group references).
    Template(&'static str),
    /// A function computing the replacement from the match captures.
    With(fn(&Captures<'_>) -> String),
}

enum Action {
    Replace { pattern: Regex, rewrite: Rewrite },
    Transform(fn(&str) -> String),
}

/// A single named rewrite step.
pub struct Rule {
    name: &'static str,
    action: Action,
}

impl Rule {
    /// Creates a rule replacing every match of `pattern` with `template`.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regex. Patterns are compile-time
    /// literals; every chain is exercised by unit tests.
    #[must_use]
    pub fn replace(name: &'static str, pattern: &str, template: &'static str) -> Self {
        Self::regex(name, pattern, Rewrite::Template(template))
    }

    /// Creates a rule replacing every match of `pattern` with the result of
    /// `rewrite`.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regex.
    #[must_use]
    pub fn replace_with(
        name: &'static str,
        pattern: &str,
        rewrite: fn(&Captures<'_>) -> String,
    ) -> Self {
        Self::regex(name, pattern, Rewrite::With(rewrite))
    }

    /// Creates a rule that rewrites the whole text with `transform`.
    #[must_use]
    pub fn transform(name: &'static str, transform: fn(&str) -> String) -> Self {
        Self {
            name,
            action: Action::Transform(transform),
        }
    }

    fn regex(name: &'static str, pattern: &str, rewrite: Rewrite) -> Self {
        let pattern = Regex::new(pattern).expect("rule pattern is a valid regex");
        Self {
            name,
            action: Action::Replace { pattern, rewrite },
        }
    }

    /// Returns the rule's name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Applies the rule to `text`.
    ///
    /// Regex rules replace all non-overlapping matches in a single scan;
    /// they do not re-scan their own output.
    #[must_use]
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.action {
            Action::Replace {
                pattern,
                rewrite: Rewrite::Template(template),
            } => pattern.replace_all(text, *template),
            Action::Replace {
                pattern,
                rewrite: Rewrite::With(rewrite),
            } => pattern.replace_all(text, |caps: &Captures<'_>| rewrite(caps)),
            Action::Transform(transform) => Cow::Owned(transform(text)),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.action {
            Action::Replace { pattern, .. } => pattern.as_str(),
            Action::Transform(_) => "<transform>",
        };
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("action", &kind)
            .finish()
    }
}

/// An ordered sequence of rules.
#[derive(Debug)]
pub struct RuleChain {
    rules: Vec<Rule>,
}

impl RuleChain {
    /// Creates a chain applying `rules` in the given order.
    #[must_use]
    pub const fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Applies every rule once, in order.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        let mut text = text.to_owned();
        for rule in &self.rules {
            let rewritten = match rule.apply(&text) {
                Cow::Borrowed(_) => None,
                Cow::Owned(next) => Some(next),
            };
            if let Some(next) = rewritten {
                text = next;
            }
        }
        text
    }

    /// Applies the chain repeatedly until a pass leaves the text unchanged.
    ///
    /// Only meaningful for chains whose rules never lengthen the text;
    /// otherwise the loop may not terminate.
    #[must_use]
    pub fn apply_until_stable(&self, text: &str) -> String {
        let mut current = self.apply(text);
        loop {
            let next = self.apply(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// Returns the rule names in application order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(Rule::name)
    }

    /// Looks up a rule by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the chain has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shout(text: &str) -> String {
        text.to_uppercase()
    }

    #[test]
    fn template_rule_expands_groups() {
        let rule = Rule::replace("swap", r"(\w+)=(\w+)", "${2}=${1}");
        assert_eq!(rule.apply("a=b c=d"), "b=a d=c");
    }

    #[test]
    fn unmatched_rule_borrows_input() {
        let rule = Rule::replace("noop", "zzz", "");
        assert!(matches!(rule.apply("abc"), Cow::Borrowed("abc")));
    }

    #[test]
    fn closure_rule_uses_captures() {
        let rule = Rule::replace_with("len", r"\w+", |caps| caps[0].len().to_string());
        assert_eq!(rule.apply("ab cde"), "2 3");
    }

    #[test]
    fn chain_applies_in_order() {
        let chain = RuleChain::new(vec![
            Rule::replace("a-to-b", "a", "b"),
            Rule::replace("b-to-c", "b", "c"),
        ]);
        assert_eq!(chain.apply("ab"), "cc");

        let reversed = RuleChain::new(vec![
            Rule::replace("b-to-c", "b", "c"),
            Rule::replace("a-to-b", "a", "b"),
        ]);
        assert_eq!(reversed.apply("ab"), "bc");
    }

    #[test]
    fn chain_exposes_names_in_order() {
        let chain = RuleChain::new(vec![
            Rule::transform("shout", shout),
            Rule::replace("x", "X", "y"),
        ]);
        assert_eq!(chain.names().collect::<Vec<_>>(), ["shout", "x"]);
        assert_eq!(chain.len(), 2);
        assert!(chain.get("shout").is_some());
        assert!(chain.get("missing").is_none());
    }

    #[test]
    fn apply_until_stable_reaches_fixed_point() {
        let chain = RuleChain::new(vec![Rule::replace("strip-ab", "ab", "")]);
        // One pass of "aabb" leaves "ab"; the second pass removes it.
        assert_eq!(chain.apply("aabb"), "ab");
        assert_eq!(chain.apply_until_stable("aabb"), "");
    }
}
