//! Shared foundation for JourneyMAPS
//!
//! This crate defines the types every other `jmaps-*` crate builds on:
//! - [`JValue`]: the dynamic value carried by a parameter tree leaf
//! - [`SqlType`] / [`SqlScalar`]: the canonical SQL projection used for
//!   fingerprinting and cache schemas
//! - [`CoreError`]: the error produced when a value cannot be cast to SQL

pub mod error;
pub mod sql;
pub mod value;

pub use error::CoreError;
pub use sql::{cast_sql_value, sql_type_tag, SqlScalar, SqlType};
pub use value::JValue;
