//! The recursive graph walk: resolve a path's cache status, run its
//! subpaths (batched or not), then the path itself.

use crate::error::EngineError;
use crate::load::load;
use crate::meta::MetaCache;
use crate::save::save;
use indexmap::IndexMap;
use jmaps_cache::CacheStore;
use jmaps_config::JourneyConfig;
use jmaps_param::JParam;
use jmaps_path::{Path, PathOptions, PathResult, SubpathOutcome, SubpathResults};
use std::collections::HashMap;
use tracing::debug;

/// Run `name` against `env`, recursing into its subpaths first.
///
/// `is_root` distinguishes the top-level invocation, which must still
/// materialize subpath results on a cache hit (so plotting has
/// something to work with), from a nested invocation, which can return
/// a hit immediately.
///
/// A path with `save_datetime() == true` is always executed: every
/// successful run appends a fresh, timestamped `Result` row, so loading
/// from cache would skip a recomputation the caller is relying on.
pub fn run_inner<S: CacheStore>(
    paths: &HashMap<String, Box<dyn Path>>,
    store: &mut S,
    meta: &mut MetaCache,
    config: &JourneyConfig,
    env: &mut JParam,
    name: &str,
    options: &PathOptions,
    is_root: bool,
) -> Result<PathResult, EngineError> {
    let path: &dyn Path = paths
        .get(name)
        .map(|b| b.as_ref())
        .ok_or_else(|| EngineError::UnknownPath { name: name.to_string() })?;

    env.init_run(is_root, None);
    env.reset_usage();

    if options.may_use_cache() && !path.save_datetime() {
        if let Some(hit) = load(store, meta, config.cache_db_meta(), env, name)? {
            if !is_root {
                return Ok(hit);
            }
            let subpath_options = options.for_subpath();
            let subpath_results = run_subpaths(paths, store, meta, config, env, path, &subpath_options)?;
            if options.plot {
                path.plot(&hit, &subpath_results);
            }
            return Ok(hit);
        }
    }

    let subpath_options = options.for_subpath();
    let subpath_results = run_subpaths(paths, store, meta, config, env, path, &subpath_options)?;

    let result = path.run(env, &subpath_results, options.verbose)?;

    if !options.disable_saving_and_loading {
        save(store, meta, config.cache_db_meta(), config.result_dir(), env, path, &result)?;
    }

    if options.plot {
        path.plot(&result, &subpath_results);
    }

    Ok(result)
}

/// Run every subpath `name` declares, in declared order, threading an
/// independent deep-copied environment into each (and each batch entry).
fn run_subpaths<S: CacheStore>(
    paths: &HashMap<String, Box<dyn Path>>,
    store: &mut S,
    meta: &mut MetaCache,
    config: &JourneyConfig,
    env: &mut JParam,
    path: &dyn Path,
    opts: &PathOptions,
) -> Result<SubpathResults, EngineError> {
    let mut results = SubpathResults::new();

    for sub in path.subpaths() {
        match path.get_batches(sub, env, &results) {
            None => {
                let mut sub_env = env.clone();
                let outcome = run_inner(paths, store, meta, config, &mut sub_env, sub, opts, false)?;
                env.merge_usage(&sub_env);
                debug!(target: "jmaps::engine", subpath = sub.as_str(), "merged subpath usage");
                results.insert(sub.clone(), SubpathOutcome::Single(outcome));
            }
            Some(batch) => {
                let mut batch_results: IndexMap<String, PathResult> = IndexMap::new();
                let mut usage_merged = false;

                for (batch_id, mut overlay) in batch.into_iter_owned() {
                    let mut sub_env = env.clone();
                    overlay.init_run(true, Some(&sub_env));
                    sub_env.replace(&overlay)?;

                    let outcome = run_inner(paths, store, meta, config, &mut sub_env, sub, opts, false)?;

                    if !usage_merged {
                        overlay.reset_usage();
                        env.merge_usage(&sub_env);
                        usage_merged = true;
                        debug!(target: "jmaps::engine", subpath = sub.as_str(), "merged batched subpath usage");
                    }

                    batch_results.insert(batch_id, outcome);
                }

                results.insert(sub.clone(), SubpathOutcome::Batched(batch_results));
            }
        }
    }

    Ok(results)
}
