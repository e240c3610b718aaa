//! Errors raised by the cache store.

use thiserror::Error;

/// Errors produced by a [`crate::CacheSession`] implementation.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing store (database connection, filesystem) failed.
    #[error("cache backend error: {0}")]
    Backend(String),

    /// A row's JSON column could not be (de)serialized.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for CacheError {
    fn from(err: rusqlite::Error) -> Self {
        CacheError::Backend(err.to_string())
    }
}
