//! The dynamic value type carried by parameter tree leaves
//!
//! Mirrors the shape of a small dynamically-typed value used throughout
//! the rest of the workspace: enough primitive variants to cover the
//! canonical SQL types plus nested structure for buffer arguments that
//! never reach the cache (e.g. a list of coordinates passed to a
//! simulator).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unified value type for parameter tree leaves and buffer arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JValue {
    /// Absence of a value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// A timestamp, cast to POSIX seconds when projected to SQL.
    DateTime(DateTime<Utc>),
    /// Raw bytes, never directly SQL-castable.
    Bytes(Vec<u8>),
    /// Ordered list, never directly SQL-castable.
    List(Vec<JValue>),
}

impl JValue {
    /// A short, human-readable description of the runtime variant, used
    /// in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            JValue::Null => "null",
            JValue::Bool(_) => "bool",
            JValue::Int(_) => "int",
            JValue::Float(_) => "float",
            JValue::Str(_) => "str",
            JValue::DateTime(_) => "datetime",
            JValue::Bytes(_) => "bytes",
            JValue::List(_) => "list",
        }
    }
}

impl From<bool> for JValue {
    fn from(v: bool) -> Self {
        JValue::Bool(v)
    }
}

impl From<i64> for JValue {
    fn from(v: i64) -> Self {
        JValue::Int(v)
    }
}

impl From<f64> for JValue {
    fn from(v: f64) -> Self {
        JValue::Float(v)
    }
}

impl From<String> for JValue {
    fn from(v: String) -> Self {
        JValue::Str(v)
    }
}

impl From<&str> for JValue {
    fn from(v: &str) -> Self {
        JValue::Str(v.to_string())
    }
}

impl From<DateTime<Utc>> for JValue {
    fn from(v: DateTime<Utc>) -> Self {
        JValue::DateTime(v)
    }
}
