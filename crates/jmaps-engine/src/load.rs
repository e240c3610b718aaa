//! Cache-first load: resolve a path's current version, check whether the
//! local environment still matches the saved schema, and look up an
//! existing result.

use crate::error::EngineError;
use crate::meta::{MetaCache, PathMeta};
use jmaps_cache::{CacheSession, CacheStore};
use jmaps_param::JParam;
use jmaps_path::PathResult;
use std::collections::BTreeMap;
use tracing::debug;

/// Attempt to satisfy `name` from the cache against the current state of
/// `env`. Returns `Ok(None)` on any kind of miss; never treats a miss as
/// an error.
pub fn load<S: CacheStore>(
    store: &mut S,
    meta: &mut MetaCache,
    use_meta_cache: bool,
    env: &mut JParam,
    name: &str,
) -> Result<Option<PathResult>, EngineError> {
    let mut session = store.session()?;

    let current_version = match resolve_current_version(&mut session, meta, use_meta_cache, name)? {
        Some(v) => v,
        None => {
            session.commit()?;
            debug!(target: "jmaps::engine", path = name, "cache miss: no registered version");
            return Ok(None);
        }
    };

    let (env_schema, file_schema) =
        match resolve_schema(&mut session, meta, use_meta_cache, name, current_version)? {
            Some(pair) => pair,
            None => {
                session.commit()?;
                debug!(target: "jmaps::engine", path = name, current_version, "cache miss: no schema for version");
                return Ok(None);
            }
        };

    let full_projection = env.get_sql_data(true, true, false)?;
    let schema_keys = env_schema.as_object().cloned().unwrap_or_default();
    let mut temp_env = BTreeMap::new();
    for key in schema_keys.keys() {
        match full_projection.get(key) {
            Some(value) => {
                temp_env.insert(key.clone(), value.clone());
            }
            None => {
                session.commit()?;
                debug!(target: "jmaps::engine", path = name, key = key.as_str(), "cache miss: environment missing schema key");
                return Ok(None);
            }
        }
    }

    let environment = serde_json::to_value(&temp_env)?;
    let row = match session.find_result(name, current_version, &environment)? {
        Some(row) => row,
        None => {
            session.commit()?;
            debug!(target: "jmaps::engine", path = name, current_version, "cache miss: no matching result row");
            return Ok(None);
        }
    };

    env.reset_usage();
    session.commit()?;
    debug!(target: "jmaps::engine", path = name, current_version, "cache hit");

    let mut result = PathResult::new();
    if let Some(sql) = row.sql {
        let sql_map: BTreeMap<String, serde_json::Value> = serde_json::from_value(sql)?;
        result.set_sql(sql_map);
    }

    let base_path = row.file_path.map(std::path::PathBuf::from);
    let file_schema_map: Option<BTreeMap<String, String>> = match &file_schema {
        Some(v) => Some(serde_json::from_value(v.clone())?),
        None => None,
    };
    let result = match base_path {
        Some(base) => result.from_file(&base, file_schema_map.as_ref())?,
        None => result,
    };

    Ok(Some(result))
}

fn resolve_current_version<Sess: CacheSession>(
    session: &mut Sess,
    meta: &mut MetaCache,
    use_meta_cache: bool,
    name: &str,
) -> Result<Option<i64>, EngineError> {
    if use_meta_cache {
        if let Some(cached) = meta.get(name) {
            return Ok(Some(cached.current_version));
        }
    }
    Ok(session.current_version(name)?)
}

fn resolve_schema<Sess: CacheSession>(
    session: &mut Sess,
    meta: &mut MetaCache,
    use_meta_cache: bool,
    name: &str,
    current_version: i64,
) -> Result<Option<(serde_json::Value, Option<serde_json::Value>)>, EngineError> {
    if use_meta_cache {
        if let Some(cached) = meta.get(name) {
            if cached.current_version == current_version {
                return Ok(Some((cached.env_schema.clone(), cached.file_schema.clone())));
            }
        }
    }
    let Some(row) = session.path_version(name, current_version)? else {
        return Ok(None);
    };
    if use_meta_cache {
        meta.put(
            name,
            PathMeta {
                current_version,
                env_schema: row.env_schema.clone(),
                file_schema: row.file_schema.clone(),
            },
        );
    }
    Ok(Some((row.env_schema, row.file_schema)))
}
