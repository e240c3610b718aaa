//! Errors raised while building, mutating, or projecting a parameter tree.

use jmaps_core::CoreError;
use thiserror::Error;

/// Errors produced by the parameter tree (`JParam` family).
#[derive(Debug, Error)]
pub enum ParamError {
    /// A user-facing mutation (assignment/replacement) was attempted on a
    /// locked subtree.
    #[error("cannot mutate locked parameter at '{path}'")]
    LockedMutation {
        /// Dotted path of the node the mutation targeted.
        path: String,
    },

    /// Dict indexing was attempted for a key that does not exist.
    #[error("no such parameter '{key}'")]
    KeyNotFound {
        /// The missing key.
        key: String,
    },

    /// Indexing was attempted on a node that is not a `Dict`.
    #[error("'{path}' is not a dict and cannot be indexed")]
    NotADict {
        /// Dotted path of the node that was indexed.
        path: String,
    },

    /// A `Refer`'s `path_list` did not resolve to a node under the
    /// supplied root.
    #[error("refer target '{path}' could not be resolved from the environment root")]
    ReferResolutionFailed {
        /// The dotted path that failed to resolve.
        path: String,
    },

    /// A `Refer` was read before `init_run` resolved it.
    #[error("refer at '{path}' was read before init_run resolved it")]
    ReferNotInitialized {
        /// Dotted path of the unresolved refer.
        path: String,
    },

    /// A value required for SQL projection is not one of the canonical
    /// SQL types and carries no `dtype` override.
    #[error(transparent)]
    UnsupportedValueType(#[from] CoreError),
}
