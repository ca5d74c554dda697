//! Post-processing of transform output.
//!
//! Insertion points are found by case-insensitive substring search on the
//! serialized markup. Nothing outside the inserted text is changed.

use std::sync::LazyLock;

use regex::Regex;

/// Rules we always apply on top of whatever the stylesheet renders.
///
/// Only wrapping is touched; the visual design stays with the stylesheet.
pub const STYLE_RULES: &str = "
pre.oshirase {
    white-space: pre-wrap !important;
}
";

static META_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<meta\s+[^>]*charset\s*=").unwrap());

/// Injection of the fixed style block and the charset declaration.
pub trait MarkupInjector {
    fn inject_style(&self, html: &str) -> String;
    fn inject_charset_meta(&self, html: &str, encoding: &str) -> String;
}

/// [`MarkupInjector`] that splices text into the serialized markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpliceInjector;

impl MarkupInjector for SpliceInjector {
    fn inject_style(&self, html: &str) -> String {
        inject_style(html)
    }

    fn inject_charset_meta(&self, html: &str, encoding: &str) -> String {
        inject_charset_meta(html, encoding)
    }
}

pub fn style_block() -> String {
    format!("<style>\n{STYLE_RULES}\n</style>\n")
}

/// Insert the style block right before the first `</head>`, or at the very
/// start if there is none.
pub fn inject_style(html: &str) -> String {
    let block = style_block();
    match find_ignore_ascii_case(html, "</head>", 0) {
        Some(index) => splice(html, index, &block),
        None => block + html,
    }
}

pub fn has_meta_charset(html: &str) -> bool {
    META_CHARSET.is_match(html)
}

/// Declare `encoding` with a `<meta charset>` directly after the opening
/// `<head>` tag.
///
/// Markup that already declares a charset is returned unchanged, which makes
/// this idempotent. Without a head tag the declaration goes first.
pub fn inject_charset_meta(html: &str, encoding: &str) -> String {
    if has_meta_charset(html) {
        return html.to_string();
    }
    let meta = format!("<meta charset=\"{encoding}\">\n");
    let tag_end = head_start(html).and_then(|start| html[start..].find('>').map(|i| start + i));
    match tag_end {
        Some(tag_end) => splice(html, tag_end + 1, &format!("\n{meta}")),
        None => meta + html,
    }
}

fn splice(html: &str, index: usize, insert: &str) -> String {
    let mut result = String::with_capacity(html.len() + insert.len());
    result.push_str(&html[..index]);
    result.push_str(insert);
    result.push_str(&html[index..]);
    result
}

// ASCII-only lowercasing keeps byte offsets valid in the original text.
fn find_ignore_ascii_case(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack.as_bytes()[from..]
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
        .map(|i| from + i)
}

// `<head` followed by the end of the tag name, so `<header>` does not count.
fn head_start(html: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(start) = find_ignore_ascii_case(html, "<head", from) {
        let next = html.as_bytes().get(start + "<head".len());
        if matches!(next, Some(b'>' | b'/') | None) || next.is_some_and(u8::is_ascii_whitespace) {
            return Some(start);
        }
        from = start + 1;
    }
    None
}
