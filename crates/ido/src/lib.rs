/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! ido: per-request page rendering.
//!
//! This crate wires the configuration store and the tag-tree renderer to
//! their collaborators:
//! - [`RequestContext`]: request identity and ordered timestamps
//! - [`DocumentStore`]: where page documents come from
//! - [`Services`]: the collaborators a controller is built with
//! - [`WebController`]: route in, rendered page out

pub mod context;
pub mod controller;
pub mod document;
pub mod error;
pub mod services;

pub use context::{RequestContext, Stamp};
pub use controller::{ControllerConfig, Response, WebController};
pub use document::{
    Document, DocumentError, DocumentStore, MemoryDocumentStore, SelectOptions, SortKey,
    SortOrder,
};
pub use error::{Error, Result};
pub use services::Services;
