//! A `rusqlite`-backed cache store.

use crate::error::CacheError;
use crate::model::{NewPathVersion, NewResult, PathVersionRow, ResultRow};
use crate::session::{CacheSession, CacheStore};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::debug;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS path (
    name TEXT PRIMARY KEY,
    description TEXT,
    current_version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS path_version (
    name TEXT NOT NULL REFERENCES path(name),
    version INTEGER NOT NULL,
    changelog TEXT,
    env_schema TEXT NOT NULL,
    file_schema TEXT,
    PRIMARY KEY (name, version)
);

CREATE TABLE IF NOT EXISTS result (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path_name TEXT NOT NULL,
    path_version INTEGER NOT NULL,
    environment TEXT NOT NULL,
    sql TEXT,
    file_path TEXT,
    created_at TEXT,
    FOREIGN KEY (path_name, path_version) REFERENCES path_version(name, version)
);
"#;

/// A SQLite-backed cache store rooted at a single database file (or
/// `:memory:`).
pub struct SqliteCacheStore {
    conn: Connection,
}

impl SqliteCacheStore {
    /// Open (creating if necessary) the database at `path`, running the
    /// schema migration.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// An in-memory SQLite database, useful for tests that want real SQL
    /// semantics without a file on disk.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

impl CacheStore for SqliteCacheStore {
    type Session<'a> = SqliteCacheSession<'a>;

    fn session(&mut self) -> Result<Self::Session<'_>, CacheError> {
        let txn = self.conn.transaction()?;
        Ok(SqliteCacheSession { txn })
    }
}

/// An in-progress transaction against a [`SqliteCacheStore`].
pub struct SqliteCacheSession<'a> {
    txn: rusqlite::Transaction<'a>,
}

impl CacheSession for SqliteCacheSession<'_> {
    fn current_version(&mut self, path_name: &str) -> Result<Option<i64>, CacheError> {
        let version = self
            .txn
            .query_row(
                "SELECT current_version FROM path WHERE name = ?1",
                params![path_name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version)
    }

    fn path_version(&mut self, path_name: &str, version: i64) -> Result<Option<PathVersionRow>, CacheError> {
        let row = self
            .txn
            .query_row(
                "SELECT changelog, env_schema, file_schema FROM path_version WHERE name = ?1 AND version = ?2",
                params![path_name, version],
                |row| {
                    let changelog: Option<String> = row.get(0)?;
                    let env_schema: String = row.get(1)?;
                    let file_schema: Option<String> = row.get(2)?;
                    Ok((changelog, env_schema, file_schema))
                },
            )
            .optional()?;
        let Some((changelog, env_schema, file_schema)) = row else {
            return Ok(None);
        };
        Ok(Some(PathVersionRow {
            name: path_name.to_string(),
            version,
            changelog,
            env_schema: serde_json::from_str(&env_schema)?,
            file_schema: file_schema.map(|s| serde_json::from_str(&s)).transpose()?,
        }))
    }

    fn find_path_version_by_schema(
        &mut self,
        path_name: &str,
        env_schema: &serde_json::Value,
        file_schema: Option<&serde_json::Value>,
    ) -> Result<Option<i64>, CacheError> {
        let env_schema_str = serde_json::to_string(env_schema)?;
        let file_schema_str = file_schema.map(serde_json::to_string).transpose()?;
        let version = self
            .txn
            .query_row(
                "SELECT version FROM path_version WHERE name = ?1 AND env_schema = ?2 AND file_schema IS ?3",
                params![path_name, env_schema_str, file_schema_str],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version)
    }

    fn find_result(
        &mut self,
        path_name: &str,
        version: i64,
        environment: &serde_json::Value,
    ) -> Result<Option<ResultRow>, CacheError> {
        let environment_str = serde_json::to_string(environment)?;
        let row = self
            .txn
            .query_row(
                "SELECT id, sql, file_path FROM result
                 WHERE path_name = ?1 AND path_version = ?2 AND environment = ?3 AND created_at IS NULL",
                params![path_name, version, environment_str],
                |row| {
                    let id: i64 = row.get(0)?;
                    let sql: Option<String> = row.get(1)?;
                    let file_path: Option<String> = row.get(2)?;
                    Ok((id, sql, file_path))
                },
            )
            .optional()?;
        let Some((id, sql, file_path)) = row else {
            return Ok(None);
        };
        Ok(Some(ResultRow {
            id,
            path_name: path_name.to_string(),
            path_version: version,
            environment: environment.clone(),
            sql: sql.map(|s| serde_json::from_str(&s)).transpose()?,
            file_path,
            created_at: None,
        }))
    }

    fn upsert_path(&mut self, name: &str, version: i64) -> Result<(), CacheError> {
        self.txn.execute(
            "INSERT INTO path (name, description, current_version) VALUES (?1, NULL, ?2)
             ON CONFLICT(name) DO UPDATE SET current_version = excluded.current_version",
            params![name, version],
        )?;
        Ok(())
    }

    fn insert_path_version(&mut self, row: NewPathVersion) -> Result<i64, CacheError> {
        let next_version: i64 = self
            .txn
            .query_row(
                "SELECT COALESCE(MAX(version) + 1, 0) FROM path_version WHERE name = ?1",
                params![row.name],
                |r| r.get(0),
            )?;
        let env_schema_str = serde_json::to_string(&row.env_schema)?;
        let file_schema_str = row.file_schema.as_ref().map(serde_json::to_string).transpose()?;
        self.txn.execute(
            "INSERT INTO path_version (name, version, changelog, env_schema, file_schema)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![row.name, next_version, row.changelog, env_schema_str, file_schema_str],
        )?;
        Ok(next_version)
    }

    fn upsert_result(&mut self, row: NewResult) -> Result<(), CacheError> {
        let environment_str = serde_json::to_string(&row.environment)?;
        let sql_str = row.sql.as_ref().map(serde_json::to_string).transpose()?;
        let existing_id: Option<i64> = self
            .txn
            .query_row(
                "SELECT id FROM result
                 WHERE path_name = ?1 AND path_version = ?2 AND environment = ?3 AND created_at IS NULL",
                params![row.path_name, row.path_version, environment_str],
                |r| r.get(0),
            )
            .optional()?;
        match existing_id {
            Some(id) => {
                self.txn.execute(
                    "UPDATE result SET sql = ?2, file_path = ?3 WHERE id = ?1",
                    params![id, sql_str, row.file_path],
                )?;
            }
            None => {
                self.txn.execute(
                    "INSERT INTO result (path_name, path_version, environment, sql, file_path, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, NULL)",
                    params![row.path_name, row.path_version, environment_str, sql_str, row.file_path],
                )?;
            }
        }
        Ok(())
    }

    fn insert_timestamped_result(&mut self, row: NewResult) -> Result<(), CacheError> {
        let environment_str = serde_json::to_string(&row.environment)?;
        let sql_str = row.sql.as_ref().map(serde_json::to_string).transpose()?;
        let now: DateTime<Utc> = Utc::now();
        self.txn.execute(
            "INSERT INTO result (path_name, path_version, environment, sql, file_path, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![row.path_name, row.path_version, environment_str, sql_str, row.file_path, now.to_rfc3339()],
        )?;
        Ok(())
    }

    fn commit(self) -> Result<(), CacheError> {
        self.txn.commit()?;
        debug!(target: "jmaps::cache", "sqlite session committed");
        Ok(())
    }
}
