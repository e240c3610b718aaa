//! The unified error type surfaced by a [`crate::Journey`].

use jmaps_cache::CacheError;
use jmaps_config::ConfigError;
use jmaps_io::IoError;
use jmaps_param::ParamError;
use jmaps_path::PathError;
use thiserror::Error;

/// Errors produced by the Journey engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// `run` was called with a name that has never been registered.
    #[error("unknown path '{name}'")]
    UnknownPath {
        /// The unregistered name.
        name: String,
    },

    /// A path's `subpaths`/`batched_subpaths` named a path that doesn't
    /// exist. Raised at `add_path` time.
    #[error("path '{path}' declares unknown subpath '{missing}'")]
    MissingSubpath {
        /// The path whose declaration is invalid.
        path: String,
        /// The subpath name that doesn't resolve.
        missing: String,
    },

    /// The subpath graph contains a cycle. Raised at `add_path` time.
    #[error("circular subpath dependency: {}", cycle.join(" -> "))]
    CircularSubpath {
        /// The cycle, starting and ending at the same name.
        cycle: Vec<String>,
    },

    /// A parameter tree operation failed.
    #[error(transparent)]
    Param(#[from] ParamError),

    /// A path-level operation (result assembly, batching, options) failed.
    #[error(transparent)]
    Path(#[from] PathError),

    /// An IO registry operation failed.
    #[error(transparent)]
    Io(#[from] IoError),

    /// The cache store failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A fingerprint or cache payload could not be (de)serialized.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// The journey's configuration was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
