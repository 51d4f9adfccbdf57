//! Field configuration: descriptors, registries, and schema reflection.
//!
//! Application startup code declares categories and fields here; rendering
//! collaborators read the resulting descriptors at request time. Wildcard
//! definitions resolve against the reflected index schema through a
//! TTL-bounded cache, so a slow or absent index degrades configuration
//! instead of failing it.

pub mod field;
pub mod registry;
pub mod schema;

pub use field::{FieldDescriptor, FieldOptions, FieldSpec, FieldType, WILDCARD};
pub use registry::FieldRegistry;
pub use schema::{
    FileReflector, ReflectedField, SCHEMA_TTL, SchemaCache, SchemaReflector, StaticReflector,
};
