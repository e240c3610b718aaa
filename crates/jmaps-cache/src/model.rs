//! Row shapes for the three cache tables.

use chrono::{DateTime, Utc};

/// `Path(name PK, description, current_version)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRow {
    /// Unique path name.
    pub name: String,
    /// Freeform description, set on first registration.
    pub description: Option<String>,
    /// The most recently *written* version for this path.
    pub current_version: i64,
}

/// `PathVersion(name FK, version, changelog, env_schema, file_schema)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathVersionRow {
    /// The path this version belongs to.
    pub name: String,
    /// Monotonically increasing version number, scoped to `name`.
    pub version: i64,
    /// What changed since the previous version, if the path declared one.
    pub changelog: Option<String>,
    /// Dotted parameter key → canonical SQL type tag.
    pub env_schema: serde_json::Value,
    /// File key → registered type key, or `None` if the path wrote no files.
    pub file_schema: Option<serde_json::Value>,
}

/// A `PathVersion` row not yet assigned a version number.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPathVersion {
    /// The path this version belongs to.
    pub name: String,
    /// What changed since the previous version, if any.
    pub changelog: Option<String>,
    /// Dotted parameter key → canonical SQL type tag.
    pub env_schema: serde_json::Value,
    /// File key → registered type key, or `None`.
    pub file_schema: Option<serde_json::Value>,
}

/// `Result(id PK, path_name+version FK, environment, sql, file_path, created_at)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// Row id.
    pub id: i64,
    /// The path this result belongs to.
    pub path_name: String,
    /// The path version this result was produced under.
    pub path_version: i64,
    /// The value-projection of the parameters this run actually used.
    pub environment: serde_json::Value,
    /// The small relational slice of the path's output.
    pub sql: Option<serde_json::Value>,
    /// Base path under which file-backed outputs were written.
    pub file_path: Option<String>,
    /// Set only for `save_datetime` paths, where every run appends a row.
    pub created_at: Option<DateTime<Utc>>,
}

/// A `Result` row not yet assigned an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResult {
    /// The path this result belongs to.
    pub path_name: String,
    /// The path version this result was produced under.
    pub path_version: i64,
    /// The value-projection of the parameters this run actually used.
    pub environment: serde_json::Value,
    /// The small relational slice of the path's output.
    pub sql: Option<serde_json::Value>,
    /// Base path under which file-backed outputs were written.
    pub file_path: Option<String>,
}
