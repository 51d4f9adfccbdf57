//! Field descriptors and the shapes callers use to define them.
//!
//! A descriptor maps a logical field key to the underlying index field plus
//! presentation metadata. Descriptors are normalized and validated once by
//! the registry and treated as immutable afterwards; the only sanctioned
//! derivation is `resolve_match`, which pins a wildcard descriptor to a
//! concrete reflected field name.

use crate::error::ConfigError;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Marker inside `field`/`key` that requests expansion against the schema.
pub const WILDCARD: char = '*';

/// Configuration unit describing one logical display/search field.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub key: String,
    /// Underlying index field; defaults to `key` during normalization.
    #[serde(default)]
    pub field: Option<String>,
    /// Display label; defaults to a humanized form of `key`.
    #[serde(default)]
    pub label: Option<String>,
    /// Arbitrary presentation/behavior attributes, insertion-ordered.
    #[serde(default)]
    pub extras: IndexMap<String, Value>,
    // Compiled from the wildcard marker during normalization; never stored.
    #[serde(skip)]
    match_pattern: Option<Regex>,
}

/// Accepted input shapes for `FieldRegistry::define`.
///
/// Sequences are expanded by the registry, one definition per element, so a
/// single call can register several fields in order.
#[derive(Clone, Debug)]
pub enum FieldSpec {
    /// Key plus an options bag.
    Named { key: String, options: FieldOptions },
    /// Options bag alone; the key is taken from `options.field`.
    Options(FieldOptions),
    /// A pre-built descriptor.
    Descriptor(FieldDescriptor),
    /// A sequence of any of the above.
    Many(Vec<FieldSpec>),
}

/// Options bag accepted alongside (or instead of) a field key.
#[derive(Clone, Debug, Default)]
pub struct FieldOptions {
    pub field: Option<String>,
    pub label: Option<String>,
    pub extras: IndexMap<String, Value>,
}

impl FieldOptions {
    pub fn field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn extra(mut self, name: &str, value: Value) -> Self {
        self.extras.insert(name.to_string(), value);
        self
    }
}

impl From<&str> for FieldSpec {
    fn from(key: &str) -> Self {
        FieldSpec::Named {
            key: key.to_string(),
            options: FieldOptions::default(),
        }
    }
}

impl From<(&str, FieldOptions)> for FieldSpec {
    fn from((key, options): (&str, FieldOptions)) -> Self {
        FieldSpec::Named {
            key: key.to_string(),
            options,
        }
    }
}

impl From<FieldOptions> for FieldSpec {
    fn from(options: FieldOptions) -> Self {
        FieldSpec::Options(options)
    }
}

impl From<FieldDescriptor> for FieldSpec {
    fn from(descriptor: FieldDescriptor) -> Self {
        FieldSpec::Descriptor(descriptor)
    }
}

impl<T: Into<FieldSpec>> From<Vec<T>> for FieldSpec {
    fn from(specs: Vec<T>) -> Self {
        FieldSpec::Many(specs.into_iter().map(Into::into).collect())
    }
}

impl FieldDescriptor {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            field: None,
            label: None,
            extras: IndexMap::new(),
            match_pattern: None,
        }
    }

    pub(crate) fn from_options(key: Option<String>, options: FieldOptions) -> Self {
        let key = key
            .or_else(|| options.field.clone())
            .unwrap_or_default();
        Self {
            key,
            field: options.field,
            label: options.label,
            extras: options.extras,
            match_pattern: None,
        }
    }

    /// Underlying index field name after defaulting.
    pub fn source_field(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.key)
    }

    /// Display label after defaulting.
    pub fn display_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| humanize(&self.key))
    }

    pub fn match_pattern(&self) -> Option<&Regex> {
        self.match_pattern.as_ref()
    }

    /// Whether the reflected field name is claimed by this wildcard.
    pub fn matches(&self, name: &str) -> bool {
        self.match_pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(name))
    }

    /// Fill defaults and compile the wildcard pattern when the marker is set.
    ///
    /// Normalization happens exactly once, at registration; the registry
    /// rejects the descriptor outright when the pattern cannot be built.
    pub fn normalize(&mut self) -> Result<(), ConfigError> {
        if self.field.is_none() && !self.key.is_empty() {
            self.field = Some(self.key.clone());
        }

        let source = self.source_field().to_string();
        if source.contains(WILDCARD) {
            self.match_pattern = Some(compile_wildcard(&self.key, &source)?);
        }
        Ok(())
    }

    /// Reject descriptors that resolve to nothing.
    ///
    /// After normalization exactly one of {concrete field, match pattern}
    /// must hold; an empty key with no pattern means the caller passed an
    /// options bag with neither key nor field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key.is_empty() && self.match_pattern.is_none() {
            return Err(ConfigError::Configuration {
                key: String::new(),
                reason: "descriptor has neither a field key nor a match pattern".to_string(),
            });
        }
        Ok(())
    }

    /// Clone-for-match: pin a wildcard descriptor to a concrete field name.
    ///
    /// The clone drops the pattern and fixes `key`/`field` to the matched
    /// name; explicit labels survive, derived ones are re-humanized from the
    /// concrete key by `display_label`.
    pub fn resolve_match(&self, concrete: &str) -> FieldDescriptor {
        FieldDescriptor {
            key: concrete.to_string(),
            field: Some(concrete.to_string()),
            label: self.label.clone(),
            extras: self.extras.clone(),
            match_pattern: None,
        }
    }

    /// Merge a wildcard-derived descriptor into this explicit one.
    ///
    /// `self` is the pre-existing registration and wins for overlapping
    /// attributes; the derived side only contributes attributes the explicit
    /// descriptor never set.
    pub fn merge(&self, derived: &FieldDescriptor) -> FieldDescriptor {
        let mut extras = derived.extras.clone();
        for (name, value) in &self.extras {
            extras.insert(name.clone(), value.clone());
        }
        FieldDescriptor {
            key: self.key.clone(),
            field: self.field.clone().or_else(|| derived.field.clone()),
            label: self.label.clone().or_else(|| derived.label.clone()),
            extras,
            match_pattern: None,
        }
    }
}

/// Descriptor flavor carried by a registry category.
///
/// Known variants keep serialized configurations consistent; `Custom`
/// preserves forward compatibility for application-defined categories.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldType {
    Index,
    Facet,
    Search,
    Sort,
    Display,
    Custom(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Index => "index",
            FieldType::Facet => "facet",
            FieldType::Search => "search",
            FieldType::Sort => "sort",
            FieldType::Display => "display",
            FieldType::Custom(value) => value.as_str(),
        }
    }

    fn from_str(value: &str) -> Self {
        match value {
            "index" => FieldType::Index,
            "facet" => FieldType::Facet,
            "search" => FieldType::Search,
            "sort" => FieldType::Sort,
            "display" => FieldType::Display,
            other => FieldType::Custom(other.to_string()),
        }
    }

    /// Default extras stamped onto every descriptor in the category.
    ///
    /// Explicit attributes on the descriptor always win over these.
    pub fn default_extras(&self) -> Vec<(&'static str, Value)> {
        match self {
            FieldType::Facet => vec![("sort", Value::String("count".to_string()))],
            FieldType::Search => vec![("include_in_simple_select", Value::Bool(true))],
            _ => Vec::new(),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}

fn compile_wildcard(key: &str, source: &str) -> Result<Regex, ConfigError> {
    if source.matches(WILDCARD).count() > 1 {
        return Err(ConfigError::Configuration {
            key: key.to_string(),
            reason: format!("field '{source}' contains more than one wildcard marker"),
        });
    }

    let (prefix, suffix) = source
        .split_once(WILDCARD)
        .unwrap_or((source, ""));
    let pattern = format!(
        "^{}(.+){}$",
        regex::escape(prefix),
        regex::escape(suffix)
    );
    Regex::new(&pattern).map_err(|err| ConfigError::Configuration {
        key: key.to_string(),
        reason: format!("unable to compile wildcard pattern: {err}"),
    })
}

/// Turn `pub_date_sort` into `Pub Date Sort` for default labels.
fn humanize(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
