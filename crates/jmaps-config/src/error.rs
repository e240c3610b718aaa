//! Configuration errors.

use thiserror::Error;

/// Errors raised while building a [`crate::JourneyConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `result_dir` was never set on the builder.
    #[error("JourneyConfig requires a result_dir")]
    MissingResultDir,
}
