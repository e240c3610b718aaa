//! Canonical SQL type tags and casting rules
//!
//! Every value that reaches the cache store's `environment`/`sql` JSON
//! columns passes through here first. Two distinct operations are kept
//! separate on purpose:
//!
//! - [`sql_type_tag`] answers "what canonical type is this" and is what
//!   ends up in a `PathVersion.env_schema`/`file_schema` entry.
//! - [`cast_sql_value`] answers "what scalar do I actually store", which
//!   for a datetime is *not* the same shape as its tag: the tag is
//!   `datetime`, but the stored scalar is the POSIX-seconds float.

use crate::error::CoreError;
use crate::value::JValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A canonical SQL type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlType {
    /// `bool`
    Bool,
    /// `int`
    Int,
    /// `float`
    Float,
    /// `str`
    Str,
    /// `datetime` (stored as POSIX-seconds float, tagged separately)
    DateTime,
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SqlType::Bool => "bool",
            SqlType::Int => "int",
            SqlType::Float => "float",
            SqlType::Str => "str",
            SqlType::DateTime => "datetime",
        };
        f.write_str(s)
    }
}

/// A value cast down to one of the canonical SQL scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlScalar {
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating point scalar (also used for cast datetimes).
    Float(f64),
    /// String scalar.
    Str(String),
}

/// Detect the canonical tag for `value`, honoring an explicit `dtype`
/// override that short-circuits detection.
pub fn sql_type_tag(value: &JValue, dtype: Option<SqlType>) -> Result<SqlType, CoreError> {
    if let Some(t) = dtype {
        return Ok(t);
    }
    match value {
        JValue::Bool(_) => Ok(SqlType::Bool),
        JValue::Int(_) => Ok(SqlType::Int),
        JValue::Float(_) => Ok(SqlType::Float),
        JValue::Str(_) => Ok(SqlType::Str),
        JValue::DateTime(_) => Ok(SqlType::DateTime),
        other => Err(CoreError::UnsupportedValueType {
            found: other.kind_name().to_string(),
        }),
    }
}

/// Cast `value` down to a [`SqlScalar`], honoring an explicit `dtype`
/// override. Datetimes are always stored as POSIX-seconds floats,
/// regardless of the fact that their *tag* (from [`sql_type_tag`]) is
/// `datetime`.
pub fn cast_sql_value(value: &JValue, dtype: Option<SqlType>) -> Result<SqlScalar, CoreError> {
    let tag = sql_type_tag(value, dtype)?;
    let unsupported = || CoreError::UnsupportedValueType {
        found: value.kind_name().to_string(),
    };
    let scalar = match (tag, value) {
        (SqlType::Bool, JValue::Bool(b)) => SqlScalar::Bool(*b),
        (SqlType::Int, JValue::Int(i)) => SqlScalar::Int(*i),
        (SqlType::Int, JValue::Float(f)) => SqlScalar::Int(*f as i64),
        (SqlType::Float, JValue::Float(f)) => SqlScalar::Float(*f),
        (SqlType::Float, JValue::Int(i)) => SqlScalar::Float(*i as f64),
        (SqlType::Str, JValue::Str(s)) => SqlScalar::Str(s.clone()),
        (SqlType::DateTime, JValue::DateTime(dt)) => {
            SqlScalar::Float(dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1e9)
        }
        _ => return Err(unsupported()),
    };
    Ok(scalar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn tags_autodetect_per_variant() {
        assert_eq!(sql_type_tag(&JValue::Bool(true), None).unwrap(), SqlType::Bool);
        assert_eq!(sql_type_tag(&JValue::Int(1), None).unwrap(), SqlType::Int);
        assert_eq!(sql_type_tag(&JValue::Float(1.0), None).unwrap(), SqlType::Float);
        assert_eq!(sql_type_tag(&JValue::Str("a".into()), None).unwrap(), SqlType::Str);
        let dt = Utc.timestamp_opt(0, 0).unwrap();
        assert_eq!(sql_type_tag(&JValue::DateTime(dt), None).unwrap(), SqlType::DateTime);
    }

    #[test]
    fn unsupported_value_without_dtype_errors() {
        let err = sql_type_tag(&JValue::List(vec![]), None).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedValueType { .. }));
    }

    #[test]
    fn explicit_dtype_short_circuits_detection() {
        // A list has no natural tag, but an explicit dtype still applies
        // to casting; detection itself is only ever skipped, not the
        // value/tag compatibility check during cast.
        assert_eq!(
            sql_type_tag(&JValue::List(vec![]), Some(SqlType::Str)).unwrap(),
            SqlType::Str
        );
    }

    #[test]
    fn cast_datetime_to_posix_seconds() {
        let dt = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let scalar = cast_sql_value(&JValue::DateTime(dt), None).unwrap();
        assert_eq!(scalar, SqlScalar::Float(1_700_000_000.0));
        // tag remains "datetime" even though the stored scalar is a float
        assert_eq!(sql_type_tag(&JValue::DateTime(dt), None).unwrap(), SqlType::DateTime);
    }

    #[test]
    fn cast_int_to_float_dtype_override() {
        let scalar = cast_sql_value(&JValue::Int(7), Some(SqlType::Float)).unwrap();
        assert_eq!(scalar, SqlScalar::Float(7.0));
    }

    #[test]
    fn cast_incompatible_dtype_errors() {
        let err = cast_sql_value(&JValue::Str("x".into()), Some(SqlType::Bool)).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedValueType { .. }));
    }
}
