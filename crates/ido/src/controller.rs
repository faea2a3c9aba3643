/*
 * controller.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The page pipeline.
//!
//! [`WebController::handle`] turns a route into a response:
//!
//! 1. Copy the base configuration and merge every seed file into it.
//!    Unreadable seeds are logged and skipped.
//! 2. Select the page document whose `route` matches and merge it.
//! 3. Publish request values under `env.` (`src`, `route`, `request_id`).
//! 4. Lock the store; nothing changes it while rendering.
//! 5. Parse `content`, add `ld` scripts and render.

use crate::context::RequestContext;
use crate::document::{Document, SelectOptions};
use crate::error::Result;
use crate::services::Services;
use ido_config::ConfigStore;
use ido_render::linked_data::{self, LD_KEY};
use ido_render::{Node, TagTreeRenderer, html};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Configuration key holding the page's tag tree.
pub const CONTENT_KEY: &str = "content";

/// Settings for a [`WebController`].
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Seed files merged into every request's configuration, in order.
    pub seeds: Vec<PathBuf>,

    /// Collection holding page documents.
    pub pages_collection: String,

    /// Base path for static assets, published as `env.src`.
    pub src: String,

    /// Force the minimizer on or off regardless of configuration.
    pub minimize: Option<bool>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            pages_collection: "pages".to_string(),
            src: String::new(),
            minimize: None,
        }
    }
}

/// A rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn ok(body: String) -> Self {
        Self { status: 200, body }
    }

    pub fn not_found(route: &str) -> Self {
        Self {
            status: 404,
            body: html::comment(&format!("no content for route: {route}")),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Renders pages by route.
pub struct WebController {
    services: Services,
    settings: ControllerConfig,
}

impl WebController {
    pub fn new(services: Services, settings: ControllerConfig) -> Self {
        Self { services, settings }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn settings(&self) -> &ControllerConfig {
        &self.settings
    }

    /// Render the page for `route`.
    ///
    /// Missing content yields a 404 response. A render failure yields a 500
    /// response carrying the part of the page rendered before the failure.
    pub fn handle(&self, route: &str) -> Result<Response> {
        let mut context = RequestContext::new();
        info!(request_id = %context.id(), route, "handling request");

        let config = self.build_config(route, &context)?;

        let Some(content) = config.get(CONTENT_KEY) else {
            warn!(route, "no content for route");
            return Ok(Response::not_found(route));
        };
        let mut nodes = Node::parse(content)?;
        if let Some(ld) = config.get(LD_KEY) {
            let added = linked_data::inject(&mut nodes, ld);
            debug!(scripts = added, "linked data");
        }

        let renderer = TagTreeRenderer::new(&config, self.services.templates.as_ref());
        let mut body = Vec::new();
        let status = match renderer.render(&nodes, &mut body) {
            Ok(()) => 200,
            Err(e) => {
                error!(route, error = %e, "render failed");
                500
            }
        };

        let finished = context.stamp();
        info!(
            request_id = %context.id(),
            status,
            bytes = body.len(),
            elapsed_ms = context.elapsed_ms(),
            finished = %finished,
            "request complete"
        );
        Ok(Response {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    /// Steps 1 to 4: the locked configuration for one request.
    pub fn build_config(&self, route: &str, context: &RequestContext) -> Result<ConfigStore> {
        let mut config = self.services.config.clone();

        for seed in &self.settings.seeds {
            if let Err(e) = config.load_file(seed) {
                if !e.is_source_error() {
                    return Err(e.into());
                }
                warn!(path = %seed.display(), error = %e, "skipping configuration seed");
            }
        }

        if let Some(page) = self.find_page(route) {
            config.load_from_map(page)?;
        }

        config.set("env.src", self.settings.src.as_str())?;
        config.set("env.route", route)?;
        config.set("env.request_id", context.id().to_string())?;
        if let Some(minimize) = self.settings.minimize {
            config.set(ido_render::render::MINIMIZE_KEY, minimize)?;
        }

        config.lock();
        Ok(config)
    }

    fn find_page(&self, route: &str) -> Option<Document> {
        let mut filter = Document::new();
        filter.insert("route".to_string(), Value::from(route));
        let result = self.services.documents.select(
            &self.settings.pages_collection,
            &filter,
            &SelectOptions::default(),
            false,
        );
        match result {
            Ok(pages) => {
                let page = pages.into_iter().next();
                if page.is_none() {
                    debug!(route, "no page document");
                }
                page
            }
            Err(e) => {
                warn!(route, error = %e, "page lookup failed");
                None
            }
        }
    }
}
