//! Time-bounded cache over the search index's reflected field names.
//!
//! Wildcard field definitions are the only consumer: expansion needs the
//! live schema, and the index is an external collaborator that may be slow
//! or down. Failures are caught here, logged, and cached as a negative
//! result so configuration never breaks over a reflection outage.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long a reflected snapshot (or a failure) stays current.
pub const SCHEMA_TTL: Duration = Duration::from_secs(60 * 60);

/// Metadata the index reports for one of its fields.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ReflectedField {
    /// Index-side type name, when the provider reports one.
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub multi_valued: bool,
}

/// External reflection provider contract.
///
/// Implementations may fail; the cache owns the catch-and-log policy, so
/// providers should report errors honestly rather than papering over them.
pub trait SchemaReflector: Send + Sync {
    fn reflect_fields(&self) -> Result<BTreeMap<String, ReflectedField>>;
}

/// Fixed in-memory field set, for tests and reflection-free wiring.
#[derive(Clone, Debug, Default)]
pub struct StaticReflector {
    fields: BTreeMap<String, ReflectedField>,
}

impl StaticReflector {
    pub fn new(fields: BTreeMap<String, ReflectedField>) -> Self {
        Self { fields }
    }

    /// Build from bare field names with empty metadata.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            fields: names
                .into_iter()
                .map(|name| (name.to_string(), ReflectedField::default()))
                .collect(),
        }
    }
}

impl SchemaReflector for StaticReflector {
    fn reflect_fields(&self) -> Result<BTreeMap<String, ReflectedField>> {
        Ok(self.fields.clone())
    }
}

/// Reads a JSON schema snapshot (field name → metadata) from disk.
///
/// Deployments that cannot reach the index at configuration time export the
/// schema to a file instead; the file is re-read on every cache refresh so a
/// newer export is picked up after the TTL.
#[derive(Clone, Debug)]
pub struct FileReflector {
    path: PathBuf,
}

impl FileReflector {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl SchemaReflector for FileReflector {
    fn reflect_fields(&self) -> Result<BTreeMap<String, ReflectedField>> {
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("reading schema snapshot {}", self.path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("parsing schema snapshot {}", self.path.display()))
    }
}

enum CacheState {
    NotFetched,
    Fetched {
        at: Instant,
        fields: BTreeMap<String, ReflectedField>,
    },
    // Negative result: distinct from NotFetched so calls inside the TTL
    // window do not retry a failing provider.
    Failed {
        at: Instant,
    },
}

/// TTL cache over a reflection provider.
///
/// Fetch-on-miss runs synchronously on the calling thread; callers treat a
/// miss as a potentially slow operation and rely on the TTL window rather
/// than retrying in-process.
pub struct SchemaCache {
    reflector: Box<dyn SchemaReflector>,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl SchemaCache {
    pub fn new(reflector: Box<dyn SchemaReflector>) -> Self {
        Self::with_ttl(reflector, SCHEMA_TTL)
    }

    pub fn with_ttl(reflector: Box<dyn SchemaReflector>, ttl: Duration) -> Self {
        Self {
            reflector,
            ttl,
            state: Mutex::new(CacheState::NotFetched),
        }
    }

    /// Reflected fields, or an empty mapping when reflection is unavailable.
    pub fn reflected_fields(&self) -> BTreeMap<String, ReflectedField> {
        self.available_fields().unwrap_or_default()
    }

    /// Reflected fields, or `None` while the provider is failing.
    ///
    /// The distinction lets wildcard expansion stay pending across an
    /// outage instead of memoizing an empty result.
    pub fn available_fields(&self) -> Option<BTreeMap<String, ReflectedField>> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|err| err.into_inner());

        match &*state {
            CacheState::Fetched { at, fields } if at.elapsed() < self.ttl => {
                return Some(fields.clone());
            }
            CacheState::Failed { at } if at.elapsed() < self.ttl => {
                return None;
            }
            _ => {}
        }

        match self.reflector.reflect_fields() {
            Ok(fields) => {
                debug!(field_count = fields.len(), "refreshed schema reflection");
                let result = fields.clone();
                *state = CacheState::Fetched {
                    at: Instant::now(),
                    fields,
                };
                Some(result)
            }
            Err(err) => {
                warn!(error = %err, "schema reflection failed; wildcard fields will not expand");
                *state = CacheState::Failed { at: Instant::now() };
                None
            }
        }
    }
}
