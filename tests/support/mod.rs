use anyhow::Result;
use fieldset::{
    DocumentType, Extension, FieldRegistry, FieldType, RawFields, SchemaCache, StaticReflector,
};
use indexmap::IndexMap;
use serde_json::{Value, json};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Field names a small bibliographic index would reflect.
pub const REFLECTED_FIELDS: &[&str] = &[
    "author_t",
    "format",
    "id",
    "marc_display",
    "pub_date",
    "subject_geo_facet",
    "subject_topic_facet",
    "title_t",
];

pub fn reflected_registry() -> FieldRegistry {
    let cache = SchemaCache::new(Box::new(StaticReflector::from_names(
        REFLECTED_FIELDS.iter().copied(),
    )));
    let registry = FieldRegistry::new(Arc::new(cache));
    registry.declare("index", FieldType::Index).expect("declare index");
    registry.declare("facet", FieldType::Facet).expect("declare facet");
    registry.declare("search", FieldType::Search).expect("declare search");
    registry
        .declare_without_reflection("sort", FieldType::Sort)
        .expect("declare sort");
    registry
}

/// JSON schema snapshot matching `REFLECTED_FIELDS`, for the file reflector.
pub fn write_schema_snapshot() -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    let snapshot: serde_json::Map<String, Value> = REFLECTED_FIELDS
        .iter()
        .map(|name| (name.to_string(), json!({})))
        .collect();
    write!(file, "{}", Value::Object(snapshot))?;
    Ok(file)
}

pub fn record(id: &str, title: &str) -> RawFields {
    IndexMap::from_iter([
        ("id".to_string(), json!(id)),
        ("title_t".to_string(), json!(title)),
        ("author_t".to_string(), json!(["First Author", "Second Author"])),
        ("format".to_string(), json!("Book")),
    ])
}

/// Extension standing in for a MARC capability: applies only to records
/// carrying raw MARC data and contributes a `marc` exporter.
pub struct MarcExtension;

impl Extension for MarcExtension {
    fn name(&self) -> &str {
        "marc"
    }

    fn install(&self, document: &mut fieldset::Document) {
        document.will_export_as(
            "marc",
            Some("application/marc"),
            Arc::new(|doc| {
                doc.first("marc_display")
                    .and_then(|value| value.as_str().map(str::to_string))
                    .unwrap_or_default()
            }),
        );
    }
}

pub fn marc_document_type() -> DocumentType {
    let mut doc_type = DocumentType::new();
    doc_type
        .extensions_mut()
        .register_if(Arc::new(MarcExtension), |doc| doc.has("marc_display"));
    doc_type
}
