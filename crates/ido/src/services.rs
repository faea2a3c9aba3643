/*
 * services.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Collaborators a controller works with.

use crate::document::{DocumentStore, MemoryDocumentStore};
use ido_config::ConfigStore;
use ido_render::{NullResolver, TemplateResolver};

/// The base configuration, document store and template resolver.
///
/// The configuration here is the starting point for every request; each
/// request works on its own copy.
pub struct Services {
    pub config: ConfigStore,
    pub documents: Box<dyn DocumentStore>,
    pub templates: Box<dyn TemplateResolver>,
}

impl Services {
    pub fn new(
        config: ConfigStore,
        documents: impl DocumentStore + 'static,
        templates: impl TemplateResolver + 'static,
    ) -> Self {
        Self {
            config,
            documents: Box::new(documents),
            templates: Box::new(templates),
        }
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::new(ConfigStore::new(), MemoryDocumentStore::new(), NullResolver)
    }
}
