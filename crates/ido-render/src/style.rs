/*
 * style.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! CSS text for style-sheet nodes.
//!
//! Rules render as `selector{property:value;...}`. Nested rules (media
//! queries, pseudo-selectors) render inside their parent's braces. Only
//! scalar declaration values are emitted.

use crate::node::StyleRule;
use ido_config::value::is_scalar;
use serde_json::Value;
use std::fmt::Write;

/// Render a list of rules to CSS.
pub fn render_rules(rules: &[StyleRule]) -> String {
    let mut css = String::new();
    write_rules(&mut css, rules);
    css
}

fn write_rules(css: &mut String, rules: &[StyleRule]) {
    for rule in rules {
        match rule {
            StyleRule::Raw(text) => css.push_str(text),
            StyleRule::Block {
                selector,
                declarations,
                nested,
            } => {
                css.push_str(selector);
                css.push('{');
                for (property, value) in declarations {
                    if let Some(text) = declaration_value(value) {
                        // Writing to a String cannot fail
                        let _ = write!(css, "{property}:{text};");
                    }
                }
                write_rules(css, nested);
                css.push('}');
            }
        }
    }
}

fn declaration_value(value: &Value) -> Option<String> {
    is_scalar(value).then(|| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, StyleSheet};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sheet(value: Value) -> StyleSheet {
        match Node::parse(&json!({ "style": value })).unwrap().remove(0) {
            Node::Style(sheet) => sheet,
            other => panic!("expected style, got {other:?}"),
        }
    }

    #[test]
    fn test_flat_rules() {
        let sheet = sheet(json!({"children": [
            {"body": {"margin": 0, "font-family": "sans-serif"}},
            {"a.nav:hover": {"color": "red"}}
        ]}));
        assert_eq!(
            render_rules(&sheet.rules),
            "body{margin:0;font-family:sans-serif;}a.nav:hover{color:red;}"
        );
    }

    #[test]
    fn test_nested_rules() {
        let sheet = sheet(json!({"children": [
            {"@media (max-width: 600px)": {"children": [
                {".nav": {"display": "none"}}
            ]}},
            {".card": {"padding": "1em", "children": [{"&:hover": {"opacity": 0.5}}]}}
        ]}));
        assert_eq!(
            render_rules(&sheet.rules),
            "@media (max-width: 600px){.nav{display:none;}}.card{padding:1em;&:hover{opacity:0.5;}}"
        );
    }

    #[test]
    fn test_non_scalar_values_skipped() {
        let sheet = sheet(json!({"children": [
            {"p": {"color": "blue", "margin": [1, 2], "border": {"x": 1}, "gap": null}}
        ]}));
        assert_eq!(render_rules(&sheet.rules), "p{color:blue;}");
    }

    #[test]
    fn test_bool_values_render_literally() {
        let sheet = sheet(json!({"children": [{"x-flag": {"on": true, "off": false}}]}));
        assert_eq!(render_rules(&sheet.rules), "x-flag{on:true;off:false;}");
    }

    #[test]
    fn test_raw_css() {
        let sheet = sheet(json!("p{margin:0}"));
        assert_eq!(render_rules(&sheet.rules), "p{margin:0}");
    }
}
