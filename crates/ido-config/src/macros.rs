/*
 * macros.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Scanning and substitution of `{%path%}` macro tokens.
//!
//! A token starts at `{%` and ends at the first `}` that follows, provided
//! that `}` is immediately preceded by `%` and at least one character sits
//! between the markers. Stray `%` characters at either end of the key are
//! ignored, so `{%%site.name%%}` addresses `site.name`. A key that still
//! holds `%` or `{` after trimming is not a token.
//!
//! When another `{%` appears before the closing `}`, the token starts at the
//! last such `{%` and the text before it stays literal. The scanner never
//! backtracks: a `}` that fails to close a token also rules out every `{%`
//! before it, so scanning resumes after that `}`.

use std::borrow::Cow;

const OPEN: &str = "{%";

/// A macro token located in a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroSpan<'a> {
    /// Byte offset of the opening `{`.
    pub start: usize,
    /// Byte offset one past the closing `}`.
    pub end: usize,
    /// The whole token, markers included.
    pub raw: &'a str,
    /// The dot path between the markers, with stray `%` trimmed.
    pub key: &'a str,
}

/// Iterator over the macro tokens of a string, in order.
#[derive(Debug, Clone)]
pub struct MacroIter<'a> {
    text: &'a str,
    pos: usize,
}

/// Find every macro token in `text`.
pub fn scan(text: &str) -> MacroIter<'_> {
    MacroIter { text, pos: 0 }
}

impl<'a> Iterator for MacroIter<'a> {
    type Item = MacroSpan<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();
        loop {
            let open = self.pos + self.text.get(self.pos..)?.find(OPEN)?;
            let body_start = open + OPEN.len();
            // No closing brace anywhere ahead means no later token either
            let close = body_start + self.text[body_start..].find('}')?;

            // Only the last `{%` before this brace can start a token
            if let Some(inner) = self.text[body_start..close].rfind(OPEN) {
                self.pos = body_start + inner;
                continue;
            }

            self.pos = close + 1;
            if close > body_start + 1 && bytes[close - 1] == b'%' {
                let key = self.text[body_start..close - 1].trim_matches('%');
                if key.contains(['%', '{']) {
                    continue;
                }
                return Some(MacroSpan {
                    start: open,
                    end: close + 1,
                    raw: &self.text[open..=close],
                    key,
                });
            }
        }
    }
}

/// Whether `text` consists of exactly one macro token and nothing else.
pub fn single_token(text: &str) -> Option<MacroSpan<'_>> {
    let mut spans = scan(text);
    let span = spans.next()?;
    (span.start == 0 && span.end == text.len()).then_some(span)
}

/// Replace every macro token in `text` with the string `resolve` returns.
///
/// Replacement text is never scanned again. Returns the input unchanged
/// (borrowed) when it contains no tokens.
pub fn substitute<'t, F>(text: &'t str, mut resolve: F) -> Cow<'t, str>
where
    F: FnMut(&MacroSpan<'t>) -> String,
{
    let mut spans = scan(text).peekable();
    if spans.peek().is_none() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in spans {
        out.push_str(&text[last..span.start]);
        out.push_str(&resolve(&span));
        last = span.end;
    }
    out.push_str(&text[last..]);
    Cow::Owned(out)
}
