//! The document model: one wrapped index record plus derived behavior.
//!
//! Documents are dictionary-like over raw field names; the field registry is
//! a presentation-layer concern consumed by rendering collaborators, not by
//! the document itself. Construction goes through a `DocumentType`, the
//! per-class configuration object carrying the unique-key name and the
//! extension registry, so nothing here depends on ambient mutable state.

use crate::document::extensions::ExtensionRegistry;
use crate::document::response::{HighlightFragment, ResponseEnvelope};
use crate::error::DocumentError;
use crate::mime;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

/// Insertion-ordered raw record data; values may be scalar or multi-valued.
pub type RawFields = IndexMap<String, Value>;

/// Semantic name → the raw field names it projects from.
pub type SemanticFields = IndexMap<String, Vec<String>>;

/// Callable that renders a document in one export format.
pub type Exporter = Arc<dyn Fn(&Document) -> String + Send + Sync>;

/// A registered export format: content type plus how to produce it.
#[derive(Clone)]
pub struct ExportFormat {
    pub content_type: String,
    exporter: Exporter,
}

/// Per-"class" configuration for documents: unique key and extensions.
///
/// Build one per document flavor at application start and share it; every
/// document constructed through it snapshots the extension list, and the
/// unique-key name applies to all of them.
#[derive(Clone)]
pub struct DocumentType {
    unique_key: String,
    extensions: ExtensionRegistry,
}

impl Default for DocumentType {
    fn default() -> Self {
        Self {
            unique_key: "id".to_string(),
            extensions: ExtensionRegistry::new(),
        }
    }
}

impl DocumentType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the field `Document::id` reads. Defaults to `"id"`.
    pub fn unique_key(&self) -> &str {
        &self.unique_key
    }

    /// Redirect `id` to another field, for indexes with a different key.
    pub fn set_unique_key(&mut self, name: &str) {
        self.unique_key = name.to_string();
    }

    pub fn extensions_mut(&mut self) -> &mut ExtensionRegistry {
        &mut self.extensions
    }

    /// Construct a document and apply matching extensions once.
    pub fn document(&self, fields: RawFields) -> Document {
        self.build(fields, None)
    }

    /// Construct a document attached to a shared response envelope.
    pub fn document_with_response(
        &self,
        fields: RawFields,
        response: Arc<ResponseEnvelope>,
    ) -> Document {
        self.build(fields, Some(response))
    }

    fn build(&self, fields: RawFields, response: Option<Arc<ResponseEnvelope>>) -> Document {
        let mut document = Document {
            doc_type: self.clone(),
            fields,
            response,
            applied: Vec::new(),
            exports: IndexMap::new(),
        };
        self.extensions.apply(&mut document);
        document
    }
}

/// One search-index record with capabilities applied at construction.
pub struct Document {
    doc_type: DocumentType,
    fields: RawFields,
    response: Option<Arc<ResponseEnvelope>>,
    applied: Vec<String>,
    exports: IndexMap<String, ExportFormat>,
}

impl Document {
    /// Raw value for a field, untouched.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Whether the field is present in the raw data.
    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Whether the field has at least one string value matching the pattern.
    pub fn has_matching(&self, key: &str, pattern: &Regex) -> bool {
        self.values_of(key)
            .iter()
            .any(|value| value.as_str().is_some_and(|s| pattern.is_match(s)))
    }

    /// Value for a field, or `KeyNotFound`.
    pub fn fetch(&self, key: &str) -> Result<&Value, DocumentError> {
        self.fields.get(key).ok_or_else(|| DocumentError::KeyNotFound {
            key: key.to_string(),
        })
    }

    /// Value for a field, or the supplied default.
    pub fn fetch_or(&self, key: &str, default: Value) -> Value {
        self.fields.get(key).cloned().unwrap_or(default)
    }

    /// Value for a field, or whatever the fallback produces for the key.
    pub fn fetch_or_else(&self, key: &str, fallback: impl FnOnce(&str) -> Value) -> Value {
        match self.fields.get(key) {
            Some(value) => value.clone(),
            None => fallback(key),
        }
    }

    /// First element of a multi-valued field, the scalar itself otherwise.
    pub fn first(&self, key: &str) -> Option<Value> {
        match self.fields.get(key)? {
            Value::Array(values) => values.first().cloned(),
            Value::Null => None,
            value => Some(value.clone()),
        }
    }

    /// Document id, resolved through the type's configured unique key.
    pub fn id(&self) -> Option<String> {
        scalar_to_string(&self.first(self.doc_type.unique_key())?)
    }

    /// Project semantic names onto flattened lists of present raw values.
    ///
    /// Every configured semantic key appears in the output; a key whose
    /// source fields are all absent maps to an empty list, never to a
    /// missing entry.
    pub fn to_semantic_values(&self, semantics: &SemanticFields) -> IndexMap<String, Vec<Value>> {
        let mut projected = IndexMap::new();
        for (semantic, sources) in semantics {
            let mut values = Vec::new();
            for source in sources {
                for value in self.values_of(source) {
                    values.push(value.clone());
                }
            }
            projected.insert(semantic.clone(), values);
        }
        projected
    }

    /// Names of the extensions composed onto this instance, in order.
    pub fn applied_extensions(&self) -> &[String] {
        &self.applied
    }

    pub(crate) fn note_extension(&mut self, name: &str) {
        self.applied.push(name.to_string());
    }

    /// Whether the response envelope highlighted this field for this doc.
    pub fn has_highlight_field(&self, field: &str) -> bool {
        self.highlight_field(field).is_some()
    }

    /// Highlight fragments for a field, pre-escaped for direct rendering.
    ///
    /// `None` when there is no envelope, the document has no id, or the
    /// envelope has nothing for this id/field.
    pub fn highlight_field(&self, field: &str) -> Option<&[HighlightFragment]> {
        let id = self.id()?;
        self.response.as_ref()?.highlight(&id, field)
    }

    /// Register an export format with an explicit rendering callable.
    ///
    /// A missing content type resolves through the MIME table, falling back
    /// to `application/octet-stream` for unknown names. Re-registering a
    /// format replaces it, which is how later extensions win.
    pub fn will_export_as(&mut self, format: &str, content_type: Option<&str>, exporter: Exporter) {
        let content_type = content_type
            .map(str::to_string)
            .or_else(|| mime::lookup_by_extension(format).map(str::to_string))
            .unwrap_or_else(|| mime::FALLBACK_CONTENT_TYPE.to_string());
        self.exports.insert(
            format.to_string(),
            ExportFormat {
                content_type,
                exporter,
            },
        );
    }

    /// Registered formats, name → content type, in registration order.
    pub fn export_formats(&self) -> impl Iterator<Item = (&str, &str)> {
        self.exports
            .iter()
            .map(|(name, format)| (name.as_str(), format.content_type.as_str()))
    }

    /// Whether an exporter is registered for the format.
    pub fn exports_as(&self, format: &str) -> bool {
        self.exports.contains_key(format)
    }

    /// Render the document in a registered format.
    pub fn export_as(&self, format: &str) -> Result<String, DocumentError> {
        let entry = self
            .exports
            .get(format)
            .ok_or_else(|| DocumentError::MissingExporter {
                format: format.to_string(),
            })?;
        Ok((entry.exporter)(self))
    }

    /// Wrap this document's more-like-this neighbors as documents.
    ///
    /// Each neighbor is built through the same `DocumentType` and shares
    /// this document's response envelope. Neighbors that are not JSON
    /// objects are skipped; without an envelope or an id there are none.
    pub fn more_like_this(&self) -> Vec<Document> {
        let Some(response) = self.response.as_ref() else {
            return Vec::new();
        };
        let Some(id) = self.id() else {
            return Vec::new();
        };

        response
            .more_like(&id)
            .iter()
            .filter_map(|record| match record {
                Value::Object(map) => Some(
                    map.iter()
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect::<RawFields>(),
                ),
                _ => None,
            })
            .map(|fields| {
                self.doc_type
                    .document_with_response(fields, Arc::clone(response))
            })
            .collect()
    }

    fn values_of(&self, key: &str) -> Vec<&Value> {
        match self.fields.get(key) {
            Some(Value::Array(values)) => values.iter().collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(value) => vec![value],
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_fields() -> RawFields {
        IndexMap::from_iter([
            ("id".to_string(), json!("123")),
            ("title_t".to_string(), json!("A Title")),
            ("author_t".to_string(), json!(["First Author", "Second Author"])),
        ])
    }

    #[test]
    fn fetch_errors_and_defaults() {
        let document = DocumentType::new().document(sample_fields());

        assert_eq!(document.fetch("title_t").unwrap(), &json!("A Title"));
        let err = document.fetch("missing").expect_err("missing key");
        assert!(matches!(err, DocumentError::KeyNotFound { key } if key == "missing"));
        assert_eq!(document.fetch_or("missing", json!("d")), json!("d"));
        assert_eq!(
            document.fetch_or_else("missing", |key| json!(format!("no {key}"))),
            json!("no missing")
        );
    }

    #[test]
    fn first_unwraps_sequences_and_passes_scalars() {
        let document = DocumentType::new().document(sample_fields());

        assert_eq!(document.first("author_t"), Some(json!("First Author")));
        assert_eq!(document.first("title_t"), Some(json!("A Title")));
        assert_eq!(document.first("missing"), None);
    }

    #[test]
    fn has_matching_checks_values() {
        let document = DocumentType::new().document(sample_fields());
        let pattern = Regex::new("Second").unwrap();

        assert!(document.has("author_t"));
        assert!(document.has_matching("author_t", &pattern));
        assert!(!document.has_matching("title_t", &pattern));
        assert!(!document.has_matching("missing", &pattern));
    }

    #[test]
    fn unique_key_override_redirects_id() {
        let mut doc_type = DocumentType::new();
        doc_type.set_unique_key("my_unique_key");
        let document = doc_type.document(IndexMap::from_iter([
            ("id".to_string(), json!("wrong")),
            ("my_unique_key".to_string(), json!("right")),
        ]));

        assert_eq!(document.id().as_deref(), Some("right"));
    }

    #[test]
    fn numeric_ids_stringify() {
        let document =
            DocumentType::new().document(IndexMap::from_iter([("id".to_string(), json!(42))]));
        assert_eq!(document.id().as_deref(), Some("42"));
    }

    #[test]
    fn semantic_values_always_yield_lists() {
        let document = DocumentType::new().document(sample_fields());
        let semantics = SemanticFields::from_iter([
            (
                "creator".to_string(),
                vec!["author_t".to_string(), "title_t".to_string()],
            ),
            ("subject".to_string(), vec!["subject_t".to_string()]),
        ]);

        let projected = document.to_semantic_values(&semantics);
        assert_eq!(
            projected.get("creator").unwrap().as_slice(),
            [
                json!("First Author"),
                json!("Second Author"),
                json!("A Title")
            ]
        );
        // Absent sources still produce the key, with an empty list.
        assert_eq!(projected.get("subject").unwrap().len(), 0);
    }

    #[test]
    fn export_registration_resolves_content_types() {
        let mut document = DocumentType::new().document(sample_fields());
        document.will_export_as("marc", Some("application/marc"), Arc::new(|_| String::new()));
        document.will_export_as("json", None, Arc::new(|_| String::new()));
        document.will_export_as("weird", None, Arc::new(|_| String::new()));

        let formats: Vec<_> = document.export_formats().collect();
        assert_eq!(
            formats,
            vec![
                ("marc", "application/marc"),
                ("json", "application/json"),
                ("weird", mime::FALLBACK_CONTENT_TYPE),
            ]
        );
    }

    #[test]
    fn export_as_dispatches_or_errors() {
        let mut document = DocumentType::new().document(sample_fields());
        document.will_export_as(
            "txt",
            None,
            Arc::new(|doc| {
                doc.first("title_t")
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default()
            }),
        );

        assert!(document.exports_as("txt"));
        assert_eq!(document.export_as("txt").unwrap(), "A Title");
        let err = document.export_as("ris").expect_err("unregistered format");
        assert!(matches!(err, DocumentError::MissingExporter { format } if format == "ris"));
    }

    #[test]
    fn highlighting_resolves_through_the_envelope() {
        let mut envelope = ResponseEnvelope::new();
        envelope.add_highlight(
            "123",
            "title_t",
            vec![HighlightFragment::new("<em>A</em> Title")],
        );
        let doc_type = DocumentType::new();
        let document =
            doc_type.document_with_response(sample_fields(), Arc::new(envelope));

        assert!(document.has_highlight_field("title_t"));
        assert_eq!(
            document.highlight_field("title_t").unwrap()[0].as_html(),
            "<em>A</em> Title"
        );
        assert!(!document.has_highlight_field("author_t"));

        let bare = doc_type.document(sample_fields());
        assert!(bare.highlight_field("title_t").is_none());
    }

    #[test]
    fn more_like_this_wraps_neighbors_with_the_same_envelope() {
        let mut envelope = ResponseEnvelope::new();
        envelope.add_more_like("123", vec![json!({"id": "abc"}), json!("not-a-record")]);
        let envelope = Arc::new(envelope);
        let document = DocumentType::new()
            .document_with_response(sample_fields(), Arc::clone(&envelope));

        let neighbors = document.more_like_this();
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].id().as_deref(), Some("abc"));
        // The neighbor can resolve envelope sections for its own id.
        assert!(neighbors[0].more_like_this().is_empty());
    }
}
