//! `Journey`: the top-level handle owning the root environment, the
//! registered path graph, and a cache store.

use crate::error::EngineError;
use crate::meta::MetaCache;
use crate::run::run_inner;
use crate::validate::validate_paths;
use jmaps_cache::CacheStore;
use jmaps_config::JourneyConfig;
use jmaps_param::JParam;
use jmaps_path::{Path, PathOptions, PathResult};
use std::collections::HashMap;
use std::fmt;

/// A registered set of paths over a shared root environment, backed by a
/// cache store.
pub struct Journey<S: CacheStore> {
    root_env: JParam,
    paths: HashMap<String, Box<dyn Path>>,
    config: JourneyConfig,
    cache: S,
    meta: MetaCache,
}

impl<S: CacheStore> Journey<S> {
    /// Build a journey over `root_env`, persisting through `cache`.
    pub fn new(root_env: JParam, config: JourneyConfig, cache: S) -> Self {
        Self {
            root_env,
            paths: HashMap::new(),
            config,
            cache,
            meta: MetaCache::new(),
        }
    }

    /// Register a single path, revalidating the whole graph.
    pub fn add_path(&mut self, path: Box<dyn Path>) -> Result<(), EngineError> {
        self.paths.insert(path.name().to_string(), path);
        validate_paths(&self.paths)
    }

    /// Register several paths at once, validating once after all are
    /// inserted.
    pub fn add_paths(&mut self, paths: impl IntoIterator<Item = Box<dyn Path>>) -> Result<(), EngineError> {
        for path in paths {
            self.paths.insert(path.name().to_string(), path);
        }
        validate_paths(&self.paths)
    }

    /// Whether `name` has been registered.
    pub fn has_path(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    /// Re-run graph validation against the current set of registered
    /// paths. `add_path`/`add_paths` already validate on every call;
    /// this is for callers who mutate the graph some other way and want
    /// to check it standalone before running anything.
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_paths(&self.paths)
    }

    /// The default options for a `run` call, seeded from this journey's
    /// `JourneyConfig::default_plot`.
    pub fn default_options(&self) -> PathOptions {
        PathOptions {
            plot: self.config.default_plot(),
            ..PathOptions::default()
        }
    }

    /// Run `name` against a deep copy of the root environment.
    pub fn run(&mut self, name: &str, options: PathOptions) -> Result<PathResult, EngineError> {
        if !self.paths.contains_key(name) {
            return Err(EngineError::UnknownPath { name: name.to_string() });
        }
        let mut local_env = self.root_env.clone();
        run_inner(
            &self.paths,
            &mut self.cache,
            &mut self.meta,
            &self.config,
            &mut local_env,
            name,
            &options,
            true,
        )
    }
}

impl<S: CacheStore> fmt::Debug for Journey<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Journey")
            .field("paths", &self.paths.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

impl<S: CacheStore> fmt::Display for Journey<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.paths.keys().map(String::as_str).collect();
        names.sort_unstable();
        write!(f, "Journey({} path(s): {})", names.len(), names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jmaps_cache::InMemoryCacheStore;
    use jmaps_path::SubpathResults;
    use std::collections::BTreeMap;

    struct Double;

    impl Path for Double {
        fn name(&self) -> &str {
            "double"
        }
        fn subpaths(&self) -> &[String] {
            &[]
        }
        fn execute(
            &self,
            env: &mut JParam,
            _subpath_results: &SubpathResults,
            _verbose: bool,
        ) -> Result<PathResult, jmaps_path::PathError> {
            let x = match env.get("x")?.get_value() {
                jmaps_param::JValue::Int(i) => i,
                _ => 0,
            };
            let mut sql = BTreeMap::new();
            sql.insert("y".to_string(), serde_json::json!(x * 2));
            Ok(PathResult::with_sql(sql))
        }
    }

    fn config(dir: &std::path::Path) -> JourneyConfig {
        JourneyConfig::builder().result_dir(dir).build().unwrap()
    }

    #[test]
    fn unknown_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let env = JParam::dict([("x".to_string(), JParam::value(3i64))]);
        let mut journey = Journey::new(env, config(dir.path()), InMemoryCacheStore::default());
        let err = journey.run("missing", PathOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownPath { .. }));
    }

    #[test]
    fn miss_then_hit_returns_same_result_without_recomputing() {
        jmaps_io::register_builtins();
        let dir = tempfile::tempdir().unwrap();
        let env = JParam::dict([("x".to_string(), JParam::value(3i64))]);
        let mut journey = Journey::new(env, config(dir.path()), InMemoryCacheStore::default());
        journey.add_path(Box::new(Double)).unwrap();

        let first = journey.run("double", PathOptions::default()).unwrap();
        assert_eq!(first.sql().unwrap().get("y"), Some(&serde_json::json!(6)));

        let second = journey.run("double", PathOptions::default()).unwrap();
        assert_eq!(second.sql().unwrap().get("y"), Some(&serde_json::json!(6)));
    }

    #[test]
    fn display_lists_registered_paths() {
        let dir = tempfile::tempdir().unwrap();
        let env = JParam::dict(std::iter::empty());
        let mut journey = Journey::new(env, config(dir.path()), InMemoryCacheStore::default());
        journey.add_path(Box::new(Double)).unwrap();
        assert_eq!(format!("{journey}"), "Journey(1 path(s): double)");
    }
}
