/*
 * interpolate.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Macro interpolation against a node's local data.
//!
//! `{%path%}` tokens are resolved as follows:
//!
//! - Paths starting with `env.` are looked up in the configuration store,
//!   regardless of the node being rendered.
//! - Any other path is looked up in the local data of the node. For an
//!   element that data is `{tag: payload}`, so an `a` element reaches its
//!   own `url` entry as `{%a.url%}`; for a text node it is
//!   `{"textNode": text}`.
//!
//! Resolved values are stringified and trimmed. Unresolved tokens become
//! the empty string, and substituted text is never expanded again.

use crate::node::TEXT_NODE;
use ido_config::path::{lookup, lookup_in};
use ido_config::{ConfigStore, substitute, to_text};
use serde_json::{Map, Value};
use std::borrow::Cow;

const ENV_PREFIX: &str = "env.";

/// The local data macros are resolved against.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// No local data; only `env.` paths resolve.
    Empty,

    /// An arbitrary mapping or value.
    Value(&'a Value),

    /// A text node: `{"textNode": text}`.
    Text(&'a str),

    /// An element: `{tag: attributes}`.
    Element {
        tag: &'a str,
        attributes: &'a Map<String, Value>,
    },
}

impl<'a> Scope<'a> {
    /// Resolve a split path to its text.
    fn resolve(&self, segments: &[&str]) -> Option<String> {
        match *self {
            Scope::Empty => None,
            Scope::Value(value) => lookup(value, segments.iter().copied()).map(to_text),
            Scope::Text(text) => match segments {
                [TEXT_NODE] => Some(text.to_string()),
                _ => None,
            },
            Scope::Element { tag, attributes } => {
                let (first, rest) = segments.split_first()?;
                if *first != tag {
                    return None;
                }
                if rest.is_empty() {
                    return Some(Value::Object(attributes.clone()).to_string());
                }
                lookup_in(attributes, rest.iter().copied()).map(to_text)
            }
        }
    }
}

/// Resolves macros in rendered text.
#[derive(Debug, Clone, Copy)]
pub struct MacroInterpolator<'a> {
    config: &'a ConfigStore,
}

impl<'a> MacroInterpolator<'a> {
    pub fn new(config: &'a ConfigStore) -> Self {
        Self { config }
    }

    /// Resolve one macro key, or `None` when nothing is found.
    pub fn resolve(&self, key: &str, scope: &Scope<'_>) -> Option<String> {
        let text = if key.starts_with(ENV_PREFIX) {
            self.config.get(key).map(to_text)
        } else {
            let segments: Vec<&str> = key.split('.').collect();
            scope.resolve(&segments)
        };
        text.map(|t| t.trim().to_string())
    }

    /// Replace every macro in `text`; unresolved macros become "".
    pub fn interpolate<'t>(&self, text: &'t str, scope: &Scope<'_>) -> Cow<'t, str> {
        substitute(text, |span| self.resolve(span.key, scope).unwrap_or_default())
    }
}
