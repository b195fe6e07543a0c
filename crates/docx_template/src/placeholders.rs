//! Placeholder syntax helpers
//!
//! Placeholders are written as `${name}` in run text. Word frequently splits
//! such a token over several runs (spell-check marks, revision ids, formatting
//! changes in the middle of a word), so the raw XML has to be normalised
//! before the tokens can be matched as plain strings.

use quick_xml::escape::escape;
use regex_lite::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

/// A `$` followed by `{` either directly or after intervening markup,
/// up to the closing brace
fn broken_placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$(?:\{|[^{$]*>\{)[^}$]*\}").expect("valid regex"))
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^{}<>]*)\}").expect("valid regex"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"))
}

/// Wrap a placeholder name in `${...}` unless it already is
pub fn wrap(name: &str) -> Cow<'_, str> {
    if name.starts_with("${") && name.ends_with('}') {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("${{{}}}", name))
    }
}

/// Strip the `${...}` wrapper from a placeholder token
pub fn unwrap(token: &str) -> &str {
    token
        .strip_prefix("${")
        .and_then(|t| t.strip_suffix('}'))
        .unwrap_or(token)
}

/// Remove markup that Word inserted inside placeholder tokens.
///
/// A candidate span is only rewritten when the tag-free text is a complete
/// `${name}` token, so dollar amounts followed by unrelated braces survive.
pub fn fix_broken_placeholders(xml: &str) -> Cow<'_, str> {
    broken_placeholder_regex().replace_all(xml, |caps: &Captures<'_>| {
        let span = &caps[0];
        if !span.contains('<') {
            return span.to_string();
        }
        let stripped = tag_regex().replace_all(span, "");
        if stripped.starts_with("${") && placeholder_regex().is_match(&stripped) {
            stripped.into_owned()
        } else {
            span.to_string()
        }
    })
}

/// Rename every placeholder in a block to its indexed form (`${x}` → `${x#i}`)
pub fn index_placeholders(xml: &str, index: usize) -> String {
    placeholder_regex()
        .replace_all(xml, |caps: &Captures<'_>| format!("${{{}#{}}}", &caps[1], index))
        .into_owned()
}

/// List the names of all placeholders in a part, in document order
pub fn find_placeholders(xml: &str) -> Vec<String> {
    placeholder_regex()
        .captures_iter(xml)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Escape a value for insertion as run text.
///
/// `$` becomes a character reference so inserted text can never form a
/// `${...}` token that a later substitution or row clone would pick up.
pub fn escape_value(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if escaped.contains('$') {
        Cow::Owned(escaped.replace('$', "&#36;"))
    } else {
        escaped
    }
}
