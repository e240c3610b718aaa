//! Error types shared across the JourneyMAPS crates
//!
//! Every higher-level crate (`jmaps-param`, `jmaps-io`, `jmaps-engine`, ...)
//! defines its own error enum and folds [`CoreError`] into it via
//! `#[from]` rather than re-deriving value/SQL error variants at every
//! layer.

use thiserror::Error;

/// Errors produced by the value/SQL layer shared across the workspace.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A value has no canonical SQL representation and no explicit `dtype`
    /// was given to short-circuit detection.
    #[error("value {found} is not one of the canonical SQL types (bool, int, float, str, datetime) and has no dtype override")]
    UnsupportedValueType {
        /// Human-readable description of the offending value.
        found: String,
    },
}
