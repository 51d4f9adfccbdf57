//! Category-scoped field registry with wildcard expansion.
//!
//! Registries are built once at application start and read many times per
//! request. Insertion order is the default display order, duplicate keys are
//! rejected loudly, and wildcard definitions are parked until the reflected
//! schema is available, then expanded exactly once per category.

use crate::config::field::{FieldDescriptor, FieldSpec, FieldType};
use crate::config::schema::SchemaCache;
use crate::error::ConfigError;
use indexmap::IndexMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

struct Category {
    field_type: FieldType,
    reflection: bool,
    fields: IndexMap<String, FieldDescriptor>,
    // Wildcard descriptors waiting for a schema snapshot. Drained on the
    // first read that sees an available schema; an outage keeps them parked
    // so the next TTL window can still expand them.
    pending: Vec<FieldDescriptor>,
}

/// Ordered collections of field descriptors, one per declared category.
///
/// All methods take `&self`; the interior lock makes lazy wildcard
/// expansion safe under concurrent first reads. Expansion is deterministic
/// for a given schema snapshot, so duplicate fills converge.
pub struct FieldRegistry {
    schema: Arc<SchemaCache>,
    inner: Mutex<IndexMap<String, Category>>,
}

impl FieldRegistry {
    pub fn new(schema: Arc<SchemaCache>) -> Self {
        Self {
            schema,
            inner: Mutex::new(IndexMap::new()),
        }
    }

    /// Register a category and the descriptor flavor it carries.
    pub fn declare(&self, category: &str, field_type: FieldType) -> Result<(), ConfigError> {
        self.declare_category(category, field_type, true)
    }

    /// Register a category that never consults schema reflection.
    ///
    /// Wildcards defined here stay unexpanded and their matching fields are
    /// treated as absent.
    pub fn declare_without_reflection(
        &self,
        category: &str,
        field_type: FieldType,
    ) -> Result<(), ConfigError> {
        self.declare_category(category, field_type, false)
    }

    fn declare_category(
        &self,
        category: &str,
        field_type: FieldType,
        reflection: bool,
    ) -> Result<(), ConfigError> {
        let mut inner = lock(&self.inner);
        if inner.contains_key(category) {
            return Err(ConfigError::DuplicateCategory {
                category: category.to_string(),
            });
        }
        inner.insert(
            category.to_string(),
            Category {
                field_type,
                reflection,
                fields: IndexMap::new(),
                pending: Vec::new(),
            },
        );
        Ok(())
    }

    /// Define one or more fields in a category.
    pub fn define(&self, category: &str, spec: impl Into<FieldSpec>) -> Result<(), ConfigError> {
        self.define_with(category, spec, |_| {})
    }

    /// Define fields, running `customize` on each descriptor before
    /// normalization. Sequence inputs apply the callback once per element.
    pub fn define_with(
        &self,
        category: &str,
        spec: impl Into<FieldSpec>,
        customize: impl Fn(&mut FieldDescriptor),
    ) -> Result<(), ConfigError> {
        let mut inner = lock(&self.inner);
        self.define_spec(&mut inner, category, spec.into(), &customize)
    }

    fn define_spec(
        &self,
        inner: &mut IndexMap<String, Category>,
        category: &str,
        spec: FieldSpec,
        customize: &dyn Fn(&mut FieldDescriptor),
    ) -> Result<(), ConfigError> {
        let descriptor = match spec {
            FieldSpec::Many(specs) => {
                for element in specs {
                    self.define_spec(inner, category, element, customize)?;
                }
                return Ok(());
            }
            FieldSpec::Named { key, options } => {
                FieldDescriptor::from_options(Some(key), options)
            }
            FieldSpec::Options(options) => FieldDescriptor::from_options(None, options),
            FieldSpec::Descriptor(descriptor) => descriptor,
        };

        let cat = inner
            .get_mut(category)
            .ok_or_else(|| ConfigError::UnknownCategory {
                category: category.to_string(),
            })?;

        let mut descriptor = descriptor;
        customize(&mut descriptor);
        descriptor.normalize()?;

        if descriptor.match_pattern().is_some() {
            cat.pending.push(descriptor);
            return Ok(());
        }

        descriptor.validate()?;
        insert_concrete(cat, category, descriptor, false)
    }

    /// Descriptors in a category, expanding pending wildcards first.
    ///
    /// Order is definition order with wildcard-derived descriptors appended
    /// in expansion order.
    pub fn fields(&self, category: &str) -> Result<Vec<FieldDescriptor>, ConfigError> {
        let mut inner = lock(&self.inner);
        let cat = resolve_category(&mut inner, &self.schema, category)?;
        Ok(cat.fields.values().cloned().collect())
    }

    /// Look up a single descriptor, expanding pending wildcards first.
    pub fn field(
        &self,
        category: &str,
        key: &str,
    ) -> Result<Option<FieldDescriptor>, ConfigError> {
        let mut inner = lock(&self.inner);
        let cat = resolve_category(&mut inner, &self.schema, category)?;
        Ok(cat.fields.get(key).cloned())
    }

    /// Field keys in display order.
    pub fn keys(&self, category: &str) -> Result<Vec<String>, ConfigError> {
        let mut inner = lock(&self.inner);
        let cat = resolve_category(&mut inner, &self.schema, category)?;
        Ok(cat.fields.keys().cloned().collect())
    }

    /// Declared categories in declaration order.
    pub fn categories(&self) -> Vec<String> {
        lock(&self.inner).keys().cloned().collect()
    }

    /// The descriptor flavor a category was declared with.
    pub fn field_type(&self, category: &str) -> Result<FieldType, ConfigError> {
        let inner = lock(&self.inner);
        inner
            .get(category)
            .map(|cat| cat.field_type.clone())
            .ok_or_else(|| ConfigError::UnknownCategory {
                category: category.to_string(),
            })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|err| err.into_inner())
}

fn resolve_category<'a>(
    inner: &'a mut IndexMap<String, Category>,
    schema: &SchemaCache,
    category: &str,
) -> Result<&'a mut Category, ConfigError> {
    let cat = inner
        .get_mut(category)
        .ok_or_else(|| ConfigError::UnknownCategory {
            category: category.to_string(),
        })?;
    expand_pending(schema, category, cat);
    Ok(cat)
}

fn expand_pending(schema: &SchemaCache, category: &str, cat: &mut Category) {
    if cat.pending.is_empty() || !cat.reflection {
        return;
    }
    let Some(reflected) = schema.available_fields() else {
        debug!(category, "schema unavailable; wildcard fields stay pending");
        return;
    };

    let pending = std::mem::take(&mut cat.pending);
    let mut derived_count = 0usize;
    for wildcard in &pending {
        for name in reflected.keys() {
            if !wildcard.matches(name) {
                continue;
            }
            let derived = wildcard.resolve_match(name);
            // Duplicate keys on this path merge instead of erroring; the
            // pre-existing explicit descriptor wins. Insertion cannot fail.
            let _ = insert_concrete(cat, category, derived, true);
            derived_count += 1;
        }
    }
    debug!(
        category,
        wildcards = pending.len(),
        derived = derived_count,
        "expanded wildcard fields"
    );
}

fn insert_concrete(
    cat: &mut Category,
    category: &str,
    mut descriptor: FieldDescriptor,
    from_wildcard: bool,
) -> Result<(), ConfigError> {
    for (name, value) in cat.field_type.default_extras() {
        if !descriptor.extras.contains_key(name) {
            descriptor.extras.insert(name.to_string(), value);
        }
    }

    if let Some(existing) = cat.fields.get(&descriptor.key) {
        if from_wildcard {
            let merged = existing.merge(&descriptor);
            // IndexMap keeps the original position on re-insert, so merge
            // does not disturb display order.
            cat.fields.insert(merged.key.clone(), merged);
            return Ok(());
        }
        return Err(ConfigError::DuplicateField {
            category: category.to_string(),
            key: descriptor.key.clone(),
        });
    }

    cat.fields.insert(descriptor.key.clone(), descriptor);
    Ok(())
}
