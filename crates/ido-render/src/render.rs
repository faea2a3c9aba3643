/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The tag-tree renderer.
//!
//! Rendering is a plain recursive walk over [`Node`]s writing into one page
//! buffer. The buffer belongs to the outermost call: every nested call
//! enters the [`RenderDepth`] counter through a guard, and once the counter
//! is back to idle the captured page is post-processed and written out,
//! whether or not a subtree failed.

use crate::error::{RenderError, Result};
use crate::html::{self, DOCTYPE_DECLARATION, TagKind};
use crate::interpolate::{MacroInterpolator, Scope};
use crate::node::{Element, Node, STYLE, StyleSheet};
use crate::postprocess;
use crate::resolver::TemplateResolver;
use crate::style::render_rules;
use ido_config::load::{ConfigFormat, parse_str};
use ido_config::macros::single_token;
use ido_config::{ConfigStore, to_text};
use serde_json::{Map, Value};
use std::cell::Cell;
use std::io::Write;
use std::path::Path;
use tracing::{debug, trace, warn};

/// Configuration key enabling the minimizer.
pub const MINIMIZE_KEY: &str = "minimize";

/// Post-processing and safety options for a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Collapse whitespace in the finished page.
    pub minimize: bool,

    /// Remove macro tokens that survived rendering.
    pub strip_unused_macros: bool,

    /// Maximum include nesting before rendering fails.
    pub max_include_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            minimize: false,
            strip_unused_macros: true,
            max_include_depth: 50,
        }
    }
}

impl RenderOptions {
    /// Read options from configuration; `minimize` must be a boolean.
    pub fn from_config(config: &ConfigStore) -> Self {
        Self {
            minimize: config.get_bool(MINIMIZE_KEY).unwrap_or(false),
            ..Self::default()
        }
    }
}

/// Nesting counter for one render invocation.
///
/// Zero means idle. The counter is only ever changed through
/// [`DepthGuard`], so every increment is paired with a decrement.
#[derive(Debug, Default)]
pub struct RenderDepth(Cell<usize>);

impl RenderDepth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.0.get()
    }

    pub fn is_idle(&self) -> bool {
        self.0.get() == 0
    }

    /// Increment the counter until the returned guard is dropped.
    pub fn enter(&self) -> DepthGuard<'_> {
        let outermost = self.is_idle();
        self.0.set(self.0.get() + 1);
        DepthGuard {
            depth: self,
            outermost,
        }
    }
}

/// Decrements its [`RenderDepth`] when dropped.
#[derive(Debug)]
pub struct DepthGuard<'a> {
    depth: &'a RenderDepth,
    outermost: bool,
}

impl DepthGuard<'_> {
    /// Whether this guard moved the counter out of idle.
    pub fn is_outermost(&self) -> bool {
        self.outermost
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        let current = self.depth.0.get();
        self.depth.0.set(current.saturating_sub(1));
    }
}

/// Renders tag trees to HTML.
///
/// A renderer borrows the request's configuration and is meant to live for
/// one request; it is not `Sync`.
pub struct TagTreeRenderer<'a> {
    resolver: &'a dyn TemplateResolver,
    interpolator: MacroInterpolator<'a>,
    options: RenderOptions,
    depth: RenderDepth,
    includes: RenderDepth,
}

impl<'a> TagTreeRenderer<'a> {
    /// Create a renderer with options read from `config`.
    pub fn new(config: &'a ConfigStore, resolver: &'a dyn TemplateResolver) -> Self {
        Self {
            resolver,
            interpolator: MacroInterpolator::new(config),
            options: RenderOptions::from_config(config),
            depth: RenderDepth::new(),
            includes: RenderDepth::new(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn depth(&self) -> &RenderDepth {
        &self.depth
    }

    /// Render `nodes` as one page and write it to `out`.
    ///
    /// The page is post-processed and written even when rendering fails
    /// part way; the error is returned after the partial page is flushed.
    pub fn render<W: Write>(&self, nodes: &[Node], out: &mut W) -> Result<()> {
        let mut page = String::new();
        let outcome = {
            let guard = self.depth.enter();
            if !guard.is_outermost() {
                warn!(depth = self.depth.current(), "render entered while not idle");
            }
            self.render_nodes(nodes, &mut page)
        };

        if let Err(e) = &outcome {
            warn!(error = %e, bytes = page.len(), "flushing partial page");
        }
        let page = postprocess::finish(&page, &self.options);
        out.write_all(page.as_bytes())?;
        outcome
    }

    /// Render `nodes` to a string.
    pub fn render_to_string(&self, nodes: &[Node]) -> Result<String> {
        let mut out = Vec::new();
        self.render(nodes, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn render_nodes(&self, nodes: &[Node], out: &mut String) -> Result<()> {
        for node in nodes {
            self.render_node(node, out)?;
        }
        Ok(())
    }

    fn render_node(&self, node: &Node, out: &mut String) -> Result<()> {
        let _guard = self.depth.enter();
        match node {
            Node::Doctype { children } => {
                out.push_str(DOCTYPE_DECLARATION);
                self.render_nodes(children, out)
            }
            Node::Text(text) => {
                out.push_str(&self.interpolator.interpolate(text, &Scope::Text(text)));
                Ok(())
            }
            Node::Element(element) => self.render_element(element, out),
            Node::Style(sheet) => {
                self.render_style(sheet, out);
                Ok(())
            }
            Node::Include(name) => self.render_include(name, out),
        }
    }

    fn render_element(&self, element: &Element, out: &mut String) -> Result<()> {
        let tag = element.tag.as_str();
        if tag.is_empty() {
            return Ok(());
        }
        let Some(kind) = html::tag_kind(tag) else {
            warn!(tag, "unknown tag");
            out.push_str(&html::comment(&format!("unknown tag: {tag}")));
            return Ok(());
        };
        trace!(tag, depth = self.depth.current(), "element");

        out.push('<');
        out.push_str(tag);
        self.write_attributes(tag, &element.attributes, out);

        match kind {
            TagKind::Void => {
                out.push_str("/>");
                if !element.children.is_empty() {
                    debug!(tag, "ignoring children of void element");
                }
                Ok(())
            }
            TagKind::Normal => {
                out.push('>');
                self.render_nodes(&element.children, out)?;
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
                Ok(())
            }
        }
    }

    fn render_style(&self, sheet: &StyleSheet, out: &mut String) {
        let scope = Scope::Element {
            tag: STYLE,
            attributes: &sheet.attributes,
        };
        out.push_str("<style");
        self.write_attributes(STYLE, &sheet.attributes, out);
        out.push('>');
        let css = render_rules(&sheet.rules);
        out.push_str(&self.interpolator.interpolate(&css, &scope));
        out.push_str("</style>");
    }

    fn render_include(&self, name: &str, out: &mut String) -> Result<()> {
        let _guard = self.includes.enter();
        let max_depth = self.options.max_include_depth;
        if self.includes.current() > max_depth {
            return Err(RenderError::RecursiveInclude {
                name: name.to_string(),
                max_depth,
            });
        }

        let Some(source) = self.resolver.get_template(name) else {
            warn!(name, "missing include");
            out.push_str(&html::comment(&format!("missing include: {name}")));
            return Ok(());
        };

        let include_error = |message: String| RenderError::Include {
            name: name.to_string(),
            message,
        };
        let format = ConfigFormat::from_path(Path::new(name)).unwrap_or(ConfigFormat::Json);
        let tree = parse_str(&source, format, name).map_err(|e| include_error(e.to_string()))?;
        let nodes = Node::parse(&Value::Object(tree)).map_err(|e| include_error(e.to_string()))?;
        debug!(name, nodes = nodes.len(), "rendering include");
        self.render_nodes(&nodes, out)
    }

    /// Append ` name="value"` for every emittable attribute.
    fn write_attributes(&self, tag: &str, attributes: &Map<String, Value>, out: &mut String) {
        let scope = Scope::Element { tag, attributes };
        for (name, value) in attributes {
            if !html::attribute_allowed(name) {
                debug!(tag, attribute = %name, "dropping unknown attribute");
                continue;
            }
            let text = match value {
                Value::Bool(true) => {
                    out.push(' ');
                    out.push_str(name);
                    continue;
                }
                Value::Bool(false) | Value::Null => continue,
                Value::String(s) => {
                    // An attribute that is only an unresolved macro is omitted
                    if let Some(span) = single_token(s) {
                        if self.interpolator.resolve(span.key, &scope).is_none() {
                            continue;
                        }
                    }
                    s.clone()
                }
                Value::Number(n) => n.to_string(),
                Value::Array(items) => items
                    .iter()
                    .filter(|item| !item.is_object() && !item.is_array() && !item.is_null())
                    .map(to_text)
                    .collect::<Vec<_>>()
                    .join(" "),
                Value::Object(_) => {
                    debug!(tag, attribute = %name, "ignoring mapping attribute value");
                    continue;
                }
            };
            let text = self.interpolator.interpolate(&text, &scope);
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&html::escape_attribute(&text));
            out.push('"');
        }
    }
}
