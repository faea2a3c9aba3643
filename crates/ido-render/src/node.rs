/*
 * node.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The tag-tree data model.
//!
//! Pages arrive as JSON-like data where every node is a mapping from a tag
//! name to its payload:
//!
//! ```json
//! {"doctype": {"children": [
//!   {"html": {"lang": "en", "children": [
//!     {"body": {"children": [{"textNode": "Hello"}]}}
//!   ]}}
//! ]}}
//! ```
//!
//! [`Node::parse`] converts that representation into explicit [`Node`]
//! variants. A mapping with several keys yields one node per key, in order.

use crate::error::TreeError;
use ido_config::to_text;
use serde_json::{Map, Value};
use tracing::warn;

/// Reserved key for literal text.
pub const TEXT_NODE: &str = "textNode";
/// Reserved key for the document type declaration.
pub const DOCTYPE: &str = "doctype";
/// Reserved key for including another tag tree by name.
pub const INCLUDE: &str = "include";
/// Payload key holding a node's children.
pub const CHILDREN: &str = "children";
/// Tag whose children are parsed as CSS rules.
pub const STYLE: &str = "style";

/// A node of the tag tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// `<!DOCTYPE html>` followed by its children.
    Doctype { children: Vec<Node> },

    /// Literal text, emitted after macro interpolation.
    Text(String),

    /// An HTML element (known or not; the renderer decides).
    Element(Element),

    /// A `<style>` element built from selector/declaration data.
    Style(StyleSheet),

    /// Another tag tree, loaded by name when rendering.
    Include(String),
}

/// An element with its payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,

    /// Every payload entry except `children`.
    ///
    /// Entries that are not HTML attributes are never emitted but remain
    /// available to macros (`{%a.url%}` inside an `a` element).
    pub attributes: Map<String, Value>,

    pub children: Vec<Node>,
}

/// A style sheet rendered as a `<style>` block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleSheet {
    pub attributes: Map<String, Value>,
    pub rules: Vec<StyleRule>,
}

/// One entry of a style sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleRule {
    /// `selector { property: value; ... nested rules }`
    Block {
        selector: String,
        declarations: Map<String, Value>,
        nested: Vec<StyleRule>,
    },

    /// Literal CSS text.
    Raw(String),
}

impl Node {
    /// Parse a tag-tree mapping into nodes.
    pub fn parse(value: &Value) -> Result<Vec<Node>, TreeError> {
        let Value::Object(map) = value else {
            return Err(TreeError::NotAMapping {
                found: describe(value),
            });
        };
        map.iter()
            .map(|(tag, payload)| parse_entry(tag, payload))
            .collect()
    }

    /// Convenience constructor for a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// The first element with the given tag, depth first.
    pub fn find_element_mut<'a>(nodes: &'a mut [Node], tag: &str) -> Option<&'a mut Element> {
        nodes.iter_mut().find_map(|node| match node {
            Node::Element(element) => {
                if element.tag == tag {
                    Some(element)
                } else {
                    Node::find_element_mut(&mut element.children, tag)
                }
            }
            Node::Doctype { children } => Node::find_element_mut(children, tag),
            _ => None,
        })
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }
}

fn parse_entry(tag: &str, payload: &Value) -> Result<Node, TreeError> {
    match tag {
        TEXT_NODE => Ok(Node::Text(to_text(payload))),
        DOCTYPE => Ok(Node::Doctype {
            children: parse_children(payload.get(CHILDREN))?,
        }),
        INCLUDE => parse_include(payload),
        STYLE => Ok(Node::Style(parse_style(payload))),
        _ => parse_element(tag, payload).map(Node::Element),
    }
}

fn parse_element(tag: &str, payload: &Value) -> Result<Element, TreeError> {
    let mut element = Element::new(tag);
    match payload {
        Value::Object(map) => {
            for (key, value) in map {
                if key == CHILDREN {
                    element.children = parse_children(Some(value))?;
                } else {
                    element.attributes.insert(key.clone(), value.clone());
                }
            }
        }
        Value::Null => {}
        // `{"p": "Hello"}` is shorthand for a single text child
        Value::String(_) | Value::Number(_) | Value::Bool(_) => {
            element.children.push(Node::Text(to_text(payload)));
        }
        Value::Array(_) => element.children = parse_children(Some(payload))?,
    }
    Ok(element)
}

fn parse_children(children: Option<&Value>) -> Result<Vec<Node>, TreeError> {
    let items = match children {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items.as_slice(),
        Some(single @ Value::Object(_)) => std::slice::from_ref(single),
        Some(Value::String(text)) => return Ok(vec![Node::Text(text.clone())]),
        Some(other) => {
            warn!(found = %describe(other), "ignoring children that are not a sequence");
            return Ok(Vec::new());
        }
    };

    let mut nodes = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(_) => nodes.extend(Node::parse(item)?),
            Value::String(text) => nodes.push(Node::Text(text.clone())),
            other => warn!(found = %describe(other), "ignoring child that is not a node"),
        }
    }
    Ok(nodes)
}

fn parse_include(payload: &Value) -> Result<Node, TreeError> {
    let name = match payload {
        Value::String(name) => Some(name.as_str()),
        Value::Object(map) => map.get("src").and_then(Value::as_str),
        _ => None,
    };
    match name {
        Some(name) if !name.is_empty() => Ok(Node::Include(name.to_string())),
        _ => Err(TreeError::InvalidInclude {
            found: describe(payload),
        }),
    }
}

fn parse_style(payload: &Value) -> StyleSheet {
    let mut sheet = StyleSheet::default();
    if let Value::Object(map) = payload {
        for (key, value) in map {
            if key == CHILDREN {
                sheet.rules = parse_rules(value);
            } else {
                sheet.attributes.insert(key.clone(), value.clone());
            }
        }
    } else if let Value::String(css) = payload {
        sheet.rules.push(StyleRule::Raw(css.clone()));
    }
    sheet
}

fn parse_rules(children: &Value) -> Vec<StyleRule> {
    let items = match children {
        Value::Array(items) => items.as_slice(),
        single @ Value::Object(_) => std::slice::from_ref(single),
        _ => &[],
    };

    let mut rules = Vec::new();
    for item in items {
        let Value::Object(map) = item else {
            if let Value::String(css) = item {
                rules.push(StyleRule::Raw(css.clone()));
            }
            continue;
        };
        for (selector, body) in map {
            if selector == TEXT_NODE {
                rules.push(StyleRule::Raw(to_text(body)));
                continue;
            }
            let mut declarations = Map::new();
            let mut nested = Vec::new();
            if let Value::Object(body) = body {
                for (property, value) in body {
                    if property == CHILDREN {
                        nested = parse_rules(value);
                    } else {
                        declarations.insert(property.clone(), value.clone());
                    }
                }
            }
            rules.push(StyleRule::Block {
                selector: selector.clone(),
                declarations,
                nested,
            });
        }
    }
    rules
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(items) => format!("sequence of {} items", items.len()),
        Value::Object(_) => "mapping".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_document() {
        let nodes = Node::parse(&json!({"doctype": {"children": [
            {"html": {"lang": "en", "children": [
                {"body": {"children": [{"textNode": "Hello"}]}}
            ]}}
        ]}}))
        .unwrap();

        let expected = Node::Doctype {
            children: vec![Node::Element(
                Element::new("html")
                    .with_attribute("lang", "en")
                    .with_child(Node::Element(
                        Element::new("body").with_child(Node::text("Hello")),
                    )),
            )],
        };
        assert_eq!(nodes, vec![expected]);
    }

    #[test]
    fn test_multiple_keys_keep_order() {
        let nodes = Node::parse(&json!({"h1": null, "p": "text", "hr": {}})).unwrap();
        let tags: Vec<&str> = nodes
            .iter()
            .map(|n| match n {
                Node::Element(e) => e.tag.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(tags, vec!["h1", "p", "hr"]);
        assert_eq!(
            nodes[1],
            Node::Element(Element::new("p").with_child(Node::text("text")))
        );
    }

    #[test]
    fn test_non_attribute_payload_kept() {
        let nodes = Node::parse(&json!({"a": {"href": "{%a.url%}", "url": "/x"}})).unwrap();
        let Node::Element(element) = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(element.attributes.get("url"), Some(&json!("/x")));
        assert!(element.children.is_empty());
    }

    #[test]
    fn test_text_node_stringifies() {
        assert_eq!(
            Node::parse(&json!({"textNode": 42})).unwrap(),
            vec![Node::text("42")]
        );
    }

    #[test]
    fn test_include() {
        assert_eq!(
            Node::parse(&json!({"include": "header.json"})).unwrap(),
            vec![Node::Include("header.json".to_string())]
        );
        assert_eq!(
            Node::parse(&json!({"include": {"src": "footer.yaml"}})).unwrap(),
            vec![Node::Include("footer.yaml".to_string())]
        );
        assert!(matches!(
            Node::parse(&json!({"include": 3})),
            Err(TreeError::InvalidInclude { .. })
        ));
    }

    #[test]
    fn test_style_rules() {
        let nodes = Node::parse(&json!({"style": {"media": "screen", "children": [
            {"body": {"margin": 0, "color": "#333"}},
            {"@media (max-width: 600px)": {"children": [
                {".nav": {"display": "none"}}
            ]}},
            {"textNode": "p{margin:0}"}
        ]}}))
        .unwrap();

        let Node::Style(sheet) = &nodes[0] else {
            panic!("expected style");
        };
        assert_eq!(sheet.attributes.get("media"), Some(&json!("screen")));
        assert_eq!(sheet.rules.len(), 3);
        assert!(matches!(
            &sheet.rules[1],
            StyleRule::Block { selector, nested, .. }
                if selector == "@media (max-width: 600px)" && nested.len() == 1
        ));
        assert_eq!(sheet.rules[2], StyleRule::Raw("p{margin:0}".to_string()));
    }

    #[test]
    fn test_malformed_children_degrade() {
        let nodes = Node::parse(&json!({"div": {"children": [1, {"span": null}, true]}})).unwrap();
        assert_eq!(
            nodes,
            vec![Node::Element(
                Element::new("div").with_child(Node::Element(Element::new("span")))
            )]
        );
    }

    #[test]
    fn test_root_must_be_mapping() {
        assert!(matches!(
            Node::parse(&json!(["div"])),
            Err(TreeError::NotAMapping { .. })
        ));
    }

    #[test]
    fn test_find_element_mut() {
        let mut nodes = Node::parse(&json!({"doctype": {"children": [
            {"html": {"children": [{"head": {"children": []}}, {"body": null}]}}
        ]}}))
        .unwrap();
        let head = Node::find_element_mut(&mut nodes, "head").unwrap();
        head.children.push(Node::text("x"));
        assert!(Node::find_element_mut(&mut nodes, "footer").is_none());

        // The mutation lands in the tree, not in a copy
        let head = Node::find_element_mut(&mut nodes, "head").unwrap();
        assert_eq!(head.children, vec![Node::text("x")]);
    }

    #[test]
    fn test_find_element_mut_prefers_first_match() {
        let mut nodes = Node::parse(&json!({"main": {"children": [
            {"div": {"children": [{"p": {"id": "inner"}}]}},
            {"p": {"id": "outer"}}
        ]}}))
        .unwrap();
        let p = Node::find_element_mut(&mut nodes, "p").unwrap();
        assert_eq!(p.attributes.get("id"), Some(&json!("inner")));
    }
}
