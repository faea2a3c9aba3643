/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or mutating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A mutating operation was attempted on a locked store.
    #[error("Configuration is locked: cannot {operation}")]
    Immutable {
        /// The operation that was refused (`set`, `remove`, ...)
        operation: &'static str,
    },

    /// A configuration source could not be parsed.
    #[error("Failed to parse configuration from {source_name}: {message}")]
    Parse {
        /// File name or other label for the source
        source_name: String,
        message: String,
    },

    /// The file extension does not name a supported format.
    #[error("Unsupported configuration format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// A configuration file could not be read.
    #[error("Failed to read configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Whether this error came from reading or parsing a source, as opposed
    /// to a refused mutation.
    ///
    /// Callers seeding a store treat source errors as recoverable.
    pub fn is_source_error(&self) -> bool {
        !matches!(self, ConfigError::Immutable { .. })
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
