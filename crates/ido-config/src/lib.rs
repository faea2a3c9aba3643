/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Hierarchical, dot-addressed configuration for page rendering.
//!
//! A [`ConfigStore`] holds a tree of JSON values addressed with dot paths
//! (`site.title`, `content.children.0`). It supports:
//!
//! - Path access: [`ConfigStore::get`], [`ConfigStore::set`],
//!   [`ConfigStore::has`], [`ConfigStore::remove`]
//! - Deep merging of seed data: [`ConfigStore::load_from_map`]
//! - A mutability lock: [`ConfigStore::lock`] / [`ConfigStore::unlock`]
//! - Macro compilation: `{%path%}` tokens inside string values are replaced
//!   with the values they reference ([`ConfigStore::compile`])
//!
//! Seed files in JSON, YAML or TOML can be merged with
//! [`ConfigStore::load_file`].
//!
//! # Example
//!
//! ```
//! use ido_config::ConfigStore;
//! use serde_json::json;
//!
//! let mut config = ConfigStore::new();
//! config.set("site.name", "Acme").unwrap();
//! config.set("title", "{%site.name%} Home").unwrap();
//! config.compile().unwrap();
//!
//! assert_eq!(config.get_str("title"), Some("Acme Home"));
//! assert_eq!(config.get("site"), Some(&json!({"name": "Acme"})));
//! ```

pub mod error;
pub mod load;
pub mod macros;
pub mod merge;
pub mod path;
pub mod store;
pub mod value;

mod compile;

pub use error::{ConfigError, Result};
pub use load::ConfigFormat;
pub use macros::{MacroSpan, scan, substitute};
pub use store::ConfigStore;
pub use value::to_text;

// Re-export so downstream crates share one value type
pub use serde_json::{Map, Value};
