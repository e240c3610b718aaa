//! Errors raised while building or executing a path.

use jmaps_io::IoError;
use jmaps_param::ParamError;
use thiserror::Error;

/// Errors produced by the path abstraction (results, batches, options).
#[derive(Debug, Error)]
pub enum PathError {
    /// A run added to an existing [`crate::Batch`] disagreed with the
    /// schema inferred from the batch's first entry.
    #[error("batch entry '{batch_id}' does not match the schema established by the batch's first entry: {detail}")]
    BatchSchemaMismatch {
        /// The batch entry whose schema diverged.
        batch_id: String,
        /// What diverged.
        detail: String,
    },

    /// [`crate::PathOptions`] was built from a map containing a key that
    /// is not a recognized option.
    #[error("unknown path option '{name}'")]
    UnknownOption {
        /// The unrecognized option name.
        name: String,
    },

    /// Persisting or loading a result's `file` entries failed.
    #[error(transparent)]
    Io(#[from] IoError),

    /// Projecting a parameter tree failed while building a result.
    #[error(transparent)]
    Param(#[from] ParamError),
}
