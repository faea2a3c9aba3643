/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for request handling.

use ido_config::ConfigError;
use ido_render::TreeError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid page content: {0}")]
    Tree(#[from] TreeError),
}

pub type Result<T> = std::result::Result<T, Error>;
