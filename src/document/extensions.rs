//! Conditional capability composition for documents.
//!
//! Extensions are behavior objects installed onto individual document
//! instances at construction time, selected by evaluating a predicate once
//! against the raw data. There is no class-wide method injection: an
//! extension contributes through explicit registration hooks (typically
//! exporters), and later installs override earlier ones on conflict.

use crate::document::model::Document;
use std::sync::Arc;

/// A capability that can be installed onto a document instance.
pub trait Extension: Send + Sync {
    /// Stable name recorded on documents the extension was applied to.
    fn name(&self) -> &str;

    /// Contribute behavior to one instance (register exporters, etc.).
    fn install(&self, document: &mut Document);
}

type Predicate = Arc<dyn Fn(&Document) -> bool + Send + Sync>;

#[derive(Clone)]
struct ExtensionEntry {
    extension: Arc<dyn Extension>,
    predicate: Option<Predicate>,
}

/// Ordered list of (extension, predicate) pairs owned by a document type.
///
/// Registries are plain values: cloning a `DocumentType` snapshots the list,
/// so two types never share one by reference and mutating one cannot leak
/// into the other.
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    entries: Vec<ExtensionEntry>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension applied to every document.
    pub fn register(&mut self, extension: Arc<dyn Extension>) {
        self.entries.push(ExtensionEntry {
            extension,
            predicate: None,
        });
    }

    /// Register an extension applied only when the predicate holds.
    ///
    /// A panicking predicate is not caught; document construction fails
    /// with it, by design.
    pub fn register_if(
        &mut self,
        extension: Arc<dyn Extension>,
        predicate: impl Fn(&Document) -> bool + Send + Sync + 'static,
    ) {
        self.entries.push(ExtensionEntry {
            extension,
            predicate: Some(Arc::new(predicate)),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Evaluate predicates and install matching extensions, in order.
    pub(crate) fn apply(&self, document: &mut Document) {
        for entry in &self.entries {
            let applies = entry
                .predicate
                .as_ref()
                .is_none_or(|predicate| predicate(document));
            if applies {
                entry.extension.install(document);
                document.note_extension(entry.extension.name());
            }
        }
    }
}
