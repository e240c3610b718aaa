//! # JourneyMAPS
//!
//! A reproducible-experiment runner: parameter trees with usage
//! tracking, a path dependency graph, and an orchestrator that
//! fingerprints environments and caches results against a relational +
//! filesystem cache store.
//!
//! # Quick start
//!
//! ```no_run
//! use jmaps::{JParam, Journey, JourneyConfig, Path, PathOptions, PathResult, SubpathResults};
//! use jmaps::cache::InMemoryCacheStore;
//! use std::collections::BTreeMap;
//!
//! struct Double;
//!
//! impl Path for Double {
//!     fn name(&self) -> &str {
//!         "double"
//!     }
//!     fn subpaths(&self) -> &[String] {
//!         &[]
//!     }
//!     fn execute(
//!         &self,
//!         env: &mut JParam,
//!         _subpath_results: &SubpathResults,
//!         _verbose: bool,
//!     ) -> Result<PathResult, jmaps::PathError> {
//!         let x = match env.get("x")?.get_value() {
//!             jmaps::JValue::Int(i) => i,
//!             _ => 0,
//!         };
//!         let mut sql = BTreeMap::new();
//!         sql.insert("y".to_string(), serde_json::json!(x * 2));
//!         Ok(PathResult::with_sql(sql))
//!     }
//! }
//!
//! fn main() -> Result<(), jmaps::JourneyError> {
//!     jmaps::io::register_builtins();
//!     let dir = tempfile::tempdir().unwrap();
//!     let config = JourneyConfig::builder().result_dir(dir.path()).build()?;
//!     let env = JParam::dict([("x".to_string(), JParam::value(3i64))]);
//!     let mut journey = Journey::new(env, config, InMemoryCacheStore::default());
//!     journey.add_path(Box::new(Double))?;
//!     let result = journey.run("double", PathOptions::default())?;
//!     assert_eq!(result.sql().unwrap().get("y"), Some(&serde_json::json!(6)));
//!     Ok(())
//! }
//! ```
//!
//! # Layout
//!
//! | Crate | Purpose |
//! |-------|---------|
//! | `jmaps-core` | canonical `JValue`/SQL type tags shared by everything else |
//! | `jmaps-param` | the `JParam` parameter tree: usage tracking, locking, buffers, refers |
//! | `jmaps-io` | the type-keyed file writer/reader registry |
//! | `jmaps-path` | the `Path` trait, `PathResult`, `PathOptions`, `Batch` |
//! | `jmaps-cache` | the persisted cache store (in-memory and SQLite-backed) |
//! | `jmaps-config` | `JourneyConfig` and logging setup |
//! | `jmaps-engine` | `Journey`: graph validation, orchestration, fingerprinting |
//!
//! Internal layering is not exposed as separate public crates beyond
//! what's re-exported here; `jmaps-engine::EngineError` is re-exported as
//! [`JourneyError`], the single error type this facade surfaces.

pub use jmaps_config::{init_logging, ConfigError, JourneyConfig, JourneyConfigBuilder};
pub use jmaps_core::{cast_sql_value, sql_type_tag, CoreError, JValue, SqlScalar, SqlType};
pub use jmaps_engine::{EngineError as JourneyError, Journey};
pub use jmaps_param::{BufferFn, JParam, ParamError, ResetCondition};
pub use jmaps_path::{Batch, Path, PathError, PathOptions, PathResult, ResultValue, SubpathOutcome, SubpathResults};

/// The type-keyed writer/reader registry, re-exported as a sub-namespaced
/// module so `jmaps::io::register_builtins()` reads as one coherent
/// surface.
pub mod io {
    pub use jmaps_io::{
        read, register, register_builtins, write, BytesPayload, FileObject, IoError, IoRegistry, JsonPayload, TypeKey,
    };
}

/// The persisted cache store: in-memory and SQLite-backed
/// implementations of [`cache::CacheStore`]/[`cache::CacheSession`].
pub mod cache {
    pub use jmaps_cache::{
        CacheError, CacheSession, CacheStore, InMemoryCacheStore, InMemorySession, NewPathVersion, NewResult,
        PathRow, PathVersionRow, ResultRow,
    };

    #[cfg(feature = "sqlite")]
    pub use jmaps_cache::{SqliteCacheSession, SqliteCacheStore};
}
