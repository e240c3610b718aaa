//! The transactional session surface the engine drives to resolve
//! fingerprints, load cache hits, and persist new results.

use crate::error::CacheError;
use crate::model::{NewPathVersion, NewResult, PathVersionRow, ResultRow};

/// A single transactional round-trip against the cache store.
///
/// A session is opened per `run`/`save` and must be [`CacheSession::commit`]-ed
/// explicitly; dropping it without committing must leave no trace (the
/// in-memory and SQLite implementations both honor this).
pub trait CacheSession {
    /// `select current_version from Path where name = ?`.
    fn current_version(&mut self, path_name: &str) -> Result<Option<i64>, CacheError>;

    /// `select env_schema, file_schema from PathVersion where name = ? and version = ?`.
    fn path_version(&mut self, path_name: &str, version: i64) -> Result<Option<PathVersionRow>, CacheError>;

    /// Find an existing version with exactly this `(env_schema, file_schema)`
    /// pair, if one has already been registered for `path_name`.
    fn find_path_version_by_schema(
        &mut self,
        path_name: &str,
        env_schema: &serde_json::Value,
        file_schema: Option<&serde_json::Value>,
    ) -> Result<Option<i64>, CacheError>;

    /// `select * from Result where name=? and version=? and environment=? and created_at is null`.
    fn find_result(
        &mut self,
        path_name: &str,
        version: i64,
        environment: &serde_json::Value,
    ) -> Result<Option<ResultRow>, CacheError>;

    /// Insert `Path(name)` if it doesn't already exist, then point
    /// `current_version` at `version`.
    fn upsert_path(&mut self, name: &str, version: i64) -> Result<(), CacheError>;

    /// Allocate the next version number for `row.name` and insert it.
    /// Returns the assigned version.
    fn insert_path_version(&mut self, row: NewPathVersion) -> Result<i64, CacheError>;

    /// For an idempotent path: upsert the row keyed by
    /// `(name, version, environment, created_at IS NULL)`.
    fn upsert_result(&mut self, row: NewResult) -> Result<(), CacheError>;

    /// For a `save_datetime` path: always insert a fresh, timestamped row.
    fn insert_timestamped_result(&mut self, row: NewResult) -> Result<(), CacheError>;

    /// Commit everything done on this session. A session that is
    /// dropped without being committed leaves the store untouched.
    fn commit(self) -> Result<(), CacheError>;
}

/// Opens transactional [`CacheSession`]s against a cache store.
pub trait CacheStore {
    /// The session type this store hands out.
    type Session<'a>: CacheSession
    where
        Self: 'a;

    /// Begin a new transactional session.
    fn session(&mut self) -> Result<Self::Session<'_>, CacheError>;
}
