/*
 * compile.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! In-place macro compilation of a store's own string values.

use crate::error::Result;
use crate::macros::substitute;
use crate::store::ConfigStore;
use crate::value::to_text;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// One step from a container to a child.
#[derive(Debug, Clone)]
enum Step {
    Key(String),
    Index(usize),
}

impl ConfigStore {
    /// Replace `{%path%}` tokens in every string value with the value the
    /// path refers to.
    ///
    /// Strings are compiled one at a time in tree order, each against the
    /// store as it stands at that moment. A token whose path does not exist
    /// is left in place, so compiling is idempotent once every referenced
    /// value is itself free of tokens. Sequences and mappings are walked;
    /// other scalars are untouched.
    pub fn compile(&mut self) -> Result<()> {
        self.ensure_mutable("compile macros")?;

        let mut leaves = Vec::new();
        collect_string_leaves(self.settings(), &mut Vec::new(), &mut leaves);

        for leaf in leaves {
            let Some(Value::String(original)) = value_at(self.settings(), &leaf) else {
                continue;
            };
            let compiled = match substitute(original, |span| {
                self.get(span.key)
                    .map(to_text)
                    .unwrap_or_else(|| span.raw.to_string())
            }) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(compiled) => compiled,
            };

            if let Some(slot) = value_at_mut(self.settings_mut(), &leaf) {
                *slot = Value::String(compiled);
            }
        }
        Ok(())
    }
}

fn collect_string_leaves(map: &Map<String, Value>, prefix: &mut Vec<Step>, out: &mut Vec<Vec<Step>>) {
    for (key, value) in map {
        prefix.push(Step::Key(key.clone()));
        collect_value(value, prefix, out);
        prefix.pop();
    }
}

fn collect_value(value: &Value, prefix: &mut Vec<Step>, out: &mut Vec<Vec<Step>>) {
    match value {
        Value::String(s) if s.contains("{%") => out.push(prefix.clone()),
        Value::Object(map) => collect_string_leaves(map, prefix, out),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                prefix.push(Step::Index(index));
                collect_value(item, prefix, out);
                prefix.pop();
            }
        }
        _ => {}
    }
}

fn value_at<'v>(map: &'v Map<String, Value>, steps: &[Step]) -> Option<&'v Value> {
    let (first, rest) = steps.split_first()?;
    let Step::Key(key) = first else {
        return None;
    };
    rest.iter()
        .try_fold(map.get(key)?, |current, step| match (current, step) {
            (Value::Object(m), Step::Key(k)) => m.get(k),
            (Value::Array(items), Step::Index(i)) => items.get(*i),
            _ => None,
        })
}

fn value_at_mut<'v>(map: &'v mut Map<String, Value>, steps: &[Step]) -> Option<&'v mut Value> {
    let (first, rest) = steps.split_first()?;
    let Step::Key(key) = first else {
        return None;
    };
    rest.iter()
        .try_fold(map.get_mut(key)?, |current, step| match (current, step) {
            (Value::Object(m), Step::Key(k)) => m.get_mut(k),
            (Value::Array(items), Step::Index(i)) => items.get_mut(*i),
            _ => None,
        })
}
