//! Field configuration and document model core for discovery interfaces.
//!
//! The crate owns two halves of a search front end's engine room. The
//! configuration half maps logical field keys to presentation metadata:
//! categories of ordered field descriptors, wildcard definitions expanded
//! against the live index schema, and a TTL cache shielding configuration
//! from reflection outages. The document half wraps raw index records:
//! dictionary-style field access, semantic-field projection, highlighting
//! lookup, export-format dispatch, and conditional per-instance extensions.
//!
//! Everything around it (routing, rendering, authentication, the search
//! client itself) is a collaborator that calls in; the crate exposes traits
//! and construction APIs at those seams instead of owning them.

pub mod config;
pub mod document;
pub mod error;
pub mod mime;

pub use config::{
    FieldDescriptor, FieldOptions, FieldRegistry, FieldSpec, FieldType, FileReflector,
    ReflectedField, SCHEMA_TTL, SchemaCache, SchemaReflector, StaticReflector, WILDCARD,
};
pub use document::{
    Document, DocumentType, ExportFormat, Exporter, Extension, ExtensionRegistry,
    HighlightFragment, RawFields, ResponseEnvelope, SemanticFields,
};
pub use error::{ConfigError, DocumentError};
