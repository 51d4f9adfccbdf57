//! Error taxonomy for configuration and document access.
//!
//! Configuration-time errors are fatal by policy: registries are built once
//! at application start, so a bad descriptor or duplicate key should stop the
//! process before it serves traffic. Document-access errors surface to the
//! caller, who can recover with defaults. Schema reflection failures never
//! appear here; they are logged and degraded at the cache boundary.

use thiserror::Error;

/// Errors raised while building field registries.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The descriptor cannot be normalized or validated.
    #[error("field '{key}' cannot be resolved: {reason}")]
    Configuration { key: String, reason: String },

    /// A key was registered twice in the same category.
    #[error("duplicate field '{key}' in category '{category}'")]
    DuplicateField { category: String, key: String },

    /// A category was declared twice.
    #[error("category '{category}' is already declared")]
    DuplicateCategory { category: String },

    /// A definition targeted a category that was never declared.
    #[error("unknown field category '{category}'")]
    UnknownCategory { category: String },
}

/// Errors raised by document field access and export dispatch.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// `fetch` without a default on a missing key.
    #[error("document field '{key}' not found")]
    KeyNotFound { key: String },

    /// `export_as` for a format with no registered exporter.
    #[error("no exporter registered for format '{format}'")]
    MissingExporter { format: String },
}
