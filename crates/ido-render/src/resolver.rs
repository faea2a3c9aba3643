/*
 * resolver.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template resolution for `include` nodes.
//!
//! An include names another tag tree. Resolvers map that name to source
//! text; the renderer parses it according to the name's extension, with
//! JSON as the default.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Extension assumed for template names that carry none.
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "json";

/// Trait for loading included tag trees.
pub trait TemplateResolver {
    /// Load a template by name.
    ///
    /// Returns `None` when the template does not exist.
    fn get_template(&self, name: &str) -> Option<String>;
}

/// Resolver that loads templates from a directory.
///
/// Names are relative to the root; a name without an extension gets
/// [`DEFAULT_TEMPLATE_EXTENSION`]. Names that would leave the root are
/// treated as missing.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    root: PathBuf,
}

impl FileSystemResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateResolver for FileSystemResolver {
    fn get_template(&self, name: &str) -> Option<String> {
        let path = resolve_template_path(name, &self.root)?;
        match std::fs::read_to_string(&path) {
            Ok(source) => Some(source),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "template not readable");
                None
            }
        }
    }
}

/// Resolver that returns nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

impl TemplateResolver for NullResolver {
    fn get_template(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Resolver that serves templates from an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    templates: HashMap<String, String>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template under the name includes will use.
    pub fn add(&mut self, name: impl Into<String>, source: impl Into<String>) -> &mut Self {
        self.templates.insert(name.into(), source.into());
        self
    }

    /// Create a resolver with the given templates.
    pub fn with_templates(
        templates: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        let mut resolver = Self::new();
        for (name, source) in templates {
            resolver.add(name, source);
        }
        resolver
    }
}

impl TemplateResolver for MemoryResolver {
    fn get_template(&self, name: &str) -> Option<String> {
        self.templates.get(name).cloned()
    }
}

impl<T: TemplateResolver + ?Sized> TemplateResolver for &T {
    fn get_template(&self, name: &str) -> Option<String> {
        (**self).get_template(name)
    }
}

/// Map a template name to a file below `root`.
///
/// Returns `None` for absolute names and names containing `..`.
pub fn resolve_template_path(name: &str, root: &Path) -> Option<PathBuf> {
    let relative = Path::new(name);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if name.is_empty() || escapes {
        return None;
    }

    let path = root.join(relative);
    if relative.extension().is_some() {
        Some(path)
    } else {
        Some(path.with_extension(DEFAULT_TEMPLATE_EXTENSION))
    }
}
