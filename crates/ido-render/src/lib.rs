/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tag-tree renderer producing minimized HTML.
//!
//! A page is described as a tree of [`Node`]s, usually parsed from the
//! `content` entry of a [`ConfigStore`](ido_config::ConfigStore). The
//! [`TagTreeRenderer`] walks the tree and emits HTML:
//!
//! - Elements are checked against static tables of known tags and
//!   attributes ([`html`]); unknown tags become diagnostic comments and
//!   unknown attributes are dropped.
//! - `{%path%}` macros in text and attribute values are resolved against
//!   the node's own data, or against the configuration for `env.` paths
//!   ([`MacroInterpolator`]).
//! - The finished page is cleaned of unresolved macros and optionally
//!   minimized ([`postprocess`]).
//!
//! # Example
//!
//! ```
//! use ido_config::ConfigStore;
//! use ido_render::{Node, NullResolver, TagTreeRenderer};
//! use serde_json::json;
//!
//! let tree = json!({"doctype": {"children": [
//!     {"html": {"children": [{"body": {"children": []}}]}}
//! ]}});
//! let nodes = Node::parse(&tree).unwrap();
//!
//! let config = ConfigStore::new();
//! let renderer = TagTreeRenderer::new(&config, &NullResolver);
//! let html = renderer.render_to_string(&nodes).unwrap();
//! assert_eq!(html, "<!DOCTYPE html><html><body></body></html>");
//! ```

pub mod error;
pub mod html;
pub mod interpolate;
pub mod linked_data;
pub mod node;
pub mod postprocess;
pub mod render;
pub mod resolver;
pub mod style;

pub use error::{RenderError, Result, TreeError};
pub use interpolate::{MacroInterpolator, Scope};
pub use node::{Element, Node, StyleRule, StyleSheet};
pub use render::{DepthGuard, RenderDepth, RenderOptions, TagTreeRenderer};
pub use resolver::{FileSystemResolver, MemoryResolver, NullResolver, TemplateResolver};
