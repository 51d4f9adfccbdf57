//! Minimal MIME lookup for export-format registration.
//!
//! Covers the formats discovery front ends actually export. The table is a
//! stand-in for a full MIME registry, which the hosting framework owns; the
//! document model only needs extension → content-type resolution when a
//! format is registered without an explicit type.

/// Content type used when a format name has no table entry.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

const CONTENT_TYPES: &[(&str, &str)] = &[
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("csv", "text/csv"),
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("marc", "application/marc"),
    ("marcxml", "application/marcxml+xml"),
    ("ris", "application/x-research-info-systems"),
    ("endnote", "application/x-endnote-refer"),
    ("ttl", "text/turtle"),
    ("nt", "application/n-triples"),
    ("rdf", "application/rdf+xml"),
];

/// Resolve a format name to a content type, if the table knows it.
pub fn lookup_by_extension(name: &str) -> Option<&'static str> {
    CONTENT_TYPES
        .iter()
        .find(|(ext, _)| *ext == name)
        .map(|(_, content_type)| *content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_resolves_known_extensions() {
        assert_eq!(lookup_by_extension("json"), Some("application/json"));
        assert_eq!(lookup_by_extension("marc"), Some("application/marc"));
        assert_eq!(lookup_by_extension("bogus"), None);
    }
}
