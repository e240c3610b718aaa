//! The relational half of the split persistence model: `Path`,
//! `PathVersion`, and `Result` rows, plus the transactional session
//! surface the engine drives to resolve fingerprints and persist runs.

mod error;
mod memory;
mod model;
#[cfg(feature = "sqlite")]
mod sqlite;
mod session;

pub use error::CacheError;
pub use memory::{InMemoryCacheStore, InMemorySession};
pub use model::{NewPathVersion, NewResult, PathRow, PathVersionRow, ResultRow};
pub use session::{CacheSession, CacheStore};

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteCacheSession, SqliteCacheStore};
