//! Errors raised by the IO registry and its filesystem-backed handlers.

use thiserror::Error;

/// Errors produced while writing or reading a path's large, opaque outputs.
#[derive(Debug, Error)]
pub enum IoError {
    /// No writer is registered for the object's type (or any of its
    /// declared ancestors), or no reader is registered for a declared
    /// type key.
    #[error("no handler registered for type '{type_key}'")]
    NoHandler {
        /// The type key that resolution failed on.
        type_key: String,
    },

    /// A concrete handler rejected the value it was given, or the stored
    /// bytes could not be turned back into the expected type.
    #[error("failed to (de)serialize '{type_key}': {detail}")]
    Codec {
        /// The type key of the handler that failed.
        type_key: String,
        /// A human-readable description of the failure.
        detail: String,
    },

    /// The underlying filesystem operation failed.
    #[error("io backend error: {0}")]
    Backend(#[from] std::io::Error),
}
