//! The document model and its collaborators.
//!
//! A `DocumentType` is built once per document flavor; each raw index record
//! becomes a `Document` through it, with extensions composed at construction
//! and the optional response envelope shared across a whole result page.

pub mod extensions;
pub mod model;
pub mod response;

pub use extensions::{Extension, ExtensionRegistry};
pub use model::{
    Document, DocumentType, ExportFormat, Exporter, RawFields, SemanticFields,
};
pub use response::{HighlightFragment, ResponseEnvelope};
