//! An in-memory cache store, used in tests and for development without a
//! database file.

use crate::error::CacheError;
use crate::model::{NewPathVersion, NewResult, PathRow, PathVersionRow, ResultRow};
use crate::session::{CacheSession, CacheStore};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct Inner {
    paths: HashMap<String, PathRow>,
    versions: HashMap<(String, i64), PathVersionRow>,
    results: Vec<ResultRow>,
    next_result_id: i64,
}

/// An in-memory, process-local cache store.
///
/// Sessions snapshot the store on open and swap their working copy back
/// in on [`CacheSession::commit`]; a session dropped without committing
/// leaves the store untouched.
#[derive(Clone, Default)]
pub struct InMemoryCacheStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryCacheStore {
    /// A fresh, empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for InMemoryCacheStore {
    type Session<'a> = InMemorySession<'a>;

    fn session(&mut self) -> Result<Self::Session<'_>, CacheError> {
        let working = self.inner.lock().clone();
        Ok(InMemorySession {
            store: &self.inner,
            working,
        })
    }
}

/// An in-progress transaction against an [`InMemoryCacheStore`].
pub struct InMemorySession<'a> {
    store: &'a Arc<Mutex<Inner>>,
    working: Inner,
}

impl CacheSession for InMemorySession<'_> {
    fn current_version(&mut self, path_name: &str) -> Result<Option<i64>, CacheError> {
        Ok(self.working.paths.get(path_name).map(|p| p.current_version))
    }

    fn path_version(&mut self, path_name: &str, version: i64) -> Result<Option<PathVersionRow>, CacheError> {
        Ok(self.working.versions.get(&(path_name.to_string(), version)).cloned())
    }

    fn find_path_version_by_schema(
        &mut self,
        path_name: &str,
        env_schema: &serde_json::Value,
        file_schema: Option<&serde_json::Value>,
    ) -> Result<Option<i64>, CacheError> {
        for ((name, version), row) in self.working.versions.iter() {
            if name == path_name && &row.env_schema == env_schema && row.file_schema.as_ref() == file_schema {
                return Ok(Some(*version));
            }
        }
        Ok(None)
    }

    fn find_result(
        &mut self,
        path_name: &str,
        version: i64,
        environment: &serde_json::Value,
    ) -> Result<Option<ResultRow>, CacheError> {
        Ok(self
            .working
            .results
            .iter()
            .find(|r| {
                r.path_name == path_name
                    && r.path_version == version
                    && &r.environment == environment
                    && r.created_at.is_none()
            })
            .cloned())
    }

    fn upsert_path(&mut self, name: &str, version: i64) -> Result<(), CacheError> {
        self.working
            .paths
            .entry(name.to_string())
            .and_modify(|p| p.current_version = version)
            .or_insert_with(|| PathRow {
                name: name.to_string(),
                description: None,
                current_version: version,
            });
        Ok(())
    }

    fn insert_path_version(&mut self, row: NewPathVersion) -> Result<i64, CacheError> {
        let next_version = self
            .working
            .versions
            .keys()
            .filter(|(name, _)| name == &row.name)
            .map(|(_, v)| *v)
            .max()
            .map(|v| v + 1)
            .unwrap_or(0);
        self.working.versions.insert(
            (row.name.clone(), next_version),
            PathVersionRow {
                name: row.name,
                version: next_version,
                changelog: row.changelog,
                env_schema: row.env_schema,
                file_schema: row.file_schema,
            },
        );
        Ok(next_version)
    }

    fn upsert_result(&mut self, row: NewResult) -> Result<(), CacheError> {
        if let Some(existing) = self.working.results.iter_mut().find(|r| {
            r.path_name == row.path_name
                && r.path_version == row.path_version
                && r.environment == row.environment
                && r.created_at.is_none()
        }) {
            existing.sql = row.sql;
            existing.file_path = row.file_path;
            return Ok(());
        }
        let id = self.working.next_result_id;
        self.working.next_result_id += 1;
        self.working.results.push(ResultRow {
            id,
            path_name: row.path_name,
            path_version: row.path_version,
            environment: row.environment,
            sql: row.sql,
            file_path: row.file_path,
            created_at: None,
        });
        Ok(())
    }

    fn insert_timestamped_result(&mut self, row: NewResult) -> Result<(), CacheError> {
        let id = self.working.next_result_id;
        self.working.next_result_id += 1;
        self.working.results.push(ResultRow {
            id,
            path_name: row.path_name,
            path_version: row.path_version,
            environment: row.environment,
            sql: row.sql,
            file_path: row.file_path,
            created_at: Some(chrono::Utc::now()),
        });
        Ok(())
    }

    fn commit(self) -> Result<(), CacheError> {
        *self.store.lock() = self.working;
        Ok(())
    }
}
