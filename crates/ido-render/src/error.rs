/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for tag-tree parsing and rendering.

use thiserror::Error;

/// Errors in the shape of a tag tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The value where nodes were expected is not a mapping.
    #[error("Expected a mapping of tag names to nodes, found {found}")]
    NotAMapping { found: String },

    /// An `include` node does not name a template.
    #[error("Include node must name a template, found {found}")]
    InvalidInclude { found: String },
}

/// Errors that can occur while rendering.
///
/// Rendering degrades gracefully where it can: unknown tags, unknown
/// attributes, unresolved macros and missing includes are not errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An included template exists but could not be used.
    #[error("Failed to render include '{name}': {message}")]
    Include { name: String, message: String },

    /// Includes nested deeper than the configured limit.
    #[error("Recursive include detected (depth > {max_depth}): {name}")]
    RecursiveInclude { name: String, max_depth: usize },

    /// The tag tree is malformed.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Writing the finished page failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
