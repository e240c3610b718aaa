//! In-memory denormalization of per-path `(current_version, env_schema,
//! file_schema)`, consulted before a cache round-trip when
//! `JourneyConfig::cache_db_meta` is enabled.

use std::collections::HashMap;

/// A path's most recently seen version metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMeta {
    /// The most recently written version.
    pub current_version: i64,
    /// Dotted parameter key → canonical SQL type tag, for that version.
    pub env_schema: serde_json::Value,
    /// File key → registered type key, if the path writes files.
    pub file_schema: Option<serde_json::Value>,
}

/// Per-path metadata cache. Populated lazily on load/save misses and
/// refreshed on every save.
#[derive(Debug, Default)]
pub struct MetaCache {
    entries: HashMap<String, PathMeta>,
}

impl MetaCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached metadata for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&PathMeta> {
        self.entries.get(name)
    }

    /// Record (or overwrite) the metadata for `name`.
    pub fn put(&mut self, name: &str, meta: PathMeta) {
        self.entries.insert(name.to_string(), meta);
    }

    /// Drop any cached metadata for `name`, forcing the next lookup back
    /// to the cache store.
    pub fn invalidate(&mut self, name: &str) {
        self.entries.remove(name);
    }
}
