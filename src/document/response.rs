//! Response envelope handed to documents alongside their raw fields.
//!
//! The envelope carries the per-response sections that do not live on the
//! record itself: highlighting fragments and more-like-this neighbors, both
//! keyed by document id. The engine never parses a wire format; the hosting
//! search client builds an envelope and shares it across the documents of
//! one response.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One highlighted snippet for a document field.
///
/// Fragments arrive from the index with emphasis markup already applied and
/// entities already escaped. Callers must render them as-is; re-escaping
/// would display the markup literally.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighlightFragment(String);

impl HighlightFragment {
    pub fn new(fragment: &str) -> Self {
        Self(fragment.to_string())
    }

    /// The pre-escaped markup, safe for direct rendering.
    pub fn as_html(&self) -> &str {
        &self.0
    }
}

/// Highlighting and more-like-this sections for one search response.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    highlighting: BTreeMap<String, BTreeMap<String, Vec<HighlightFragment>>>,
    #[serde(default)]
    more_like: BTreeMap<String, Vec<Value>>,
}

impl ResponseEnvelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record highlight fragments for one field of one document.
    pub fn add_highlight(
        &mut self,
        document_id: &str,
        field: &str,
        fragments: Vec<HighlightFragment>,
    ) {
        self.highlighting
            .entry(document_id.to_string())
            .or_default()
            .insert(field.to_string(), fragments);
    }

    /// Record the more-like-this neighbors of one document.
    pub fn add_more_like(&mut self, document_id: &str, records: Vec<Value>) {
        self.more_like
            .entry(document_id.to_string())
            .or_default()
            .extend(records);
    }

    /// Highlight fragments for a document field, when present.
    pub fn highlight(&self, document_id: &str, field: &str) -> Option<&[HighlightFragment]> {
        self.highlighting
            .get(document_id)?
            .get(field)
            .map(Vec::as_slice)
    }

    /// Raw neighbor records for a document; empty when none were attached.
    pub fn more_like(&self, document_id: &str) -> &[Value] {
        self.more_like
            .get(document_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn highlight_lookup_misses_return_none() {
        let mut envelope = ResponseEnvelope::new();
        envelope.add_highlight("123", "title_t", vec![HighlightFragment::new("<em>x</em>")]);

        assert!(envelope.highlight("123", "title_t").is_some());
        assert!(envelope.highlight("123", "author_t").is_none());
        assert!(envelope.highlight("456", "title_t").is_none());
    }

    #[test]
    fn more_like_defaults_to_empty() {
        let mut envelope = ResponseEnvelope::new();
        envelope.add_more_like("123", vec![json!({"id": "abc"})]);

        assert_eq!(envelope.more_like("123").len(), 1);
        assert!(envelope.more_like("missing").is_empty());
    }

    #[test]
    fn fragment_serializes_transparently() {
        let fragment = HighlightFragment::new("<em>match</em>");
        let json = serde_json::to_string(&fragment).unwrap();
        assert_eq!(json, "\"<em>match</em>\"");
    }
}
