/*
 * postprocess.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Whole-page passes applied once rendering returns to the top level.
//!
//! 1. [`strip_unused_macros`] removes macro tokens that survived rendering.
//!    An attribute whose value is exactly one token is removed entirely,
//!    leading whitespace included; any other token is cut out of the text.
//! 2. [`minimize`] collapses whitespace. It is purely textual and does not
//!    spare `<pre>`, `<script>` or `<style>` bodies.

use crate::render::RenderOptions;
use ido_config::scan;
use std::borrow::Cow;

/// Apply the enabled passes to a finished page.
pub fn finish(page: &str, options: &RenderOptions) -> String {
    let stripped = if options.strip_unused_macros {
        strip_unused_macros(page)
    } else {
        Cow::Borrowed(page)
    };
    if options.minimize {
        minimize(&stripped)
    } else {
        stripped.into_owned()
    }
}

/// Remove macro tokens left in rendered HTML.
pub fn strip_unused_macros(html: &str) -> Cow<'_, str> {
    let mut spans = scan(html).peekable();
    if spans.peek().is_none() {
        return Cow::Borrowed(html);
    }

    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for span in spans {
        if span.start < last {
            continue;
        }
        match whole_attribute_start(html, span.start, span.end) {
            Some(attr_start) if attr_start >= last => {
                out.push_str(&html[last..attr_start]);
                // Skip the closing quote as well
                last = span.end + 1;
            }
            _ => {
                out.push_str(&html[last..span.start]);
                last = span.end;
            }
        }
    }
    out.push_str(&html[last..]);
    Cow::Owned(out)
}

/// If the token at `start..end` is the entire value of an attribute written
/// as ` name="{%...%}"`, return the offset of the whitespace before `name`.
fn whole_attribute_start(html: &str, start: usize, end: usize) -> Option<usize> {
    if !html[end..].starts_with('"') {
        return None;
    }
    let before = html[..start].strip_suffix("=\"")?;
    let name_start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_attribute_name_char(*c))
        .last()
        .map(|(i, _)| i)?;
    let space = before[..name_start].chars().next_back()?;
    space
        .is_ascii_whitespace()
        .then_some(name_start - space.len_utf8())
}

fn is_attribute_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

/// Collapse whitespace runs to one space, drop spaces before `>` and
/// between `>` and `<`, and trim the ends.
///
/// Only HTML whitespace (space, tab, newlines, form feed) counts; a
/// non-breaking space is content.
pub fn minimize(html: &str) -> String {
    let mut collapsed = String::with_capacity(html.len());
    let mut in_whitespace = false;
    for c in html.chars() {
        if c.is_ascii_whitespace() {
            if !in_whitespace {
                collapsed.push(' ');
                in_whitespace = true;
            }
        } else {
            collapsed.push(c);
            in_whitespace = false;
        }
    }

    let mut out = String::with_capacity(collapsed.len());
    let mut chars = collapsed.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ' ' {
            match chars.peek() {
                Some('>') => continue,
                Some('<') if out.ends_with('>') => continue,
                _ => {}
            }
        }
        out.push(c);
    }
    out.trim_matches(|c: char| c.is_ascii_whitespace()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_minimize_whitespace() {
        assert_eq!(minimize("a   b\n\tc"), "a b c");
    }

    #[test]
    fn test_minimize_keeps_non_breaking_space() {
        assert_eq!(minimize("Price:\u{a0}10"), "Price:\u{a0}10");
        assert_eq!(minimize("\u{a0}<p>x</p>  "), "\u{a0}<p>x</p>");
        assert_eq!(minimize("a \u{a0} b"), "a \u{a0} b");
    }

    #[test]
    fn test_minimize_between_tags() {
        assert_eq!(
            minimize("<div> <span>x</span> </div>"),
            "<div><span>x</span></div>"
        );
        assert_eq!(minimize("<p class=\"a\" >\n  hi\n</p>\n"), "<p class=\"a\"> hi </p>");
    }

    #[test]
    fn test_minimize_keeps_text_spacing() {
        assert_eq!(minimize("<b>a</b> <i>b</i>"), "<b>a</b><i>b</i>");
        assert_eq!(minimize("one <b>two</b>"), "one <b>two</b>");
    }

    #[test]
    fn test_strip_whole_attribute() {
        assert_eq!(
            strip_unused_macros(r#"<a href="{%missing.path%}" class="x">y</a>"#),
            r#"<a class="x">y</a>"#
        );
    }

    #[test]
    fn test_strip_partial_attribute() {
        assert_eq!(
            strip_unused_macros(r#"<img alt="Logo {%site.name%}" src="/a.png"/>"#),
            r#"<img alt="Logo " src="/a.png"/>"#
        );
    }

    #[test]
    fn test_strip_text_tokens() {
        assert_eq!(
            strip_unused_macros("<p>Hello, {%user%}!</p>{%tail%}"),
            "<p>Hello, !</p>"
        );
    }

    #[test]
    fn test_strip_adjacent_attributes() {
        assert_eq!(
            strip_unused_macros(r#"<a href="{%a%}" title="{%b%}">x</a>"#),
            "<a>x</a>"
        );
    }

    #[test]
    fn test_strip_leaves_clean_html_borrowed() {
        let html = "<p>clean</p>";
        assert!(matches!(strip_unused_macros(html), Cow::Borrowed(_)));
    }

    #[test]
    fn test_finish_respects_options() {
        let page = "<p> {%x%} </p>";
        let plain = RenderOptions {
            minimize: false,
            strip_unused_macros: true,
            ..RenderOptions::default()
        };
        assert_eq!(finish(page, &plain), "<p>  </p>");

        let minimized = RenderOptions {
            minimize: true,
            strip_unused_macros: true,
            ..RenderOptions::default()
        };
        assert_eq!(finish(page, &minimized), "<p></p>");

        let raw = RenderOptions {
            minimize: false,
            strip_unused_macros: false,
            ..RenderOptions::default()
        };
        assert_eq!(finish(page, &raw), page);
    }
}
