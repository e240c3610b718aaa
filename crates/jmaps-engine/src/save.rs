//! Persisting a freshly computed [`PathResult`]: write any file entries
//! to disk, register a path version for the environment's schema if
//! needed, and upsert (or append) the relational row.

use crate::error::EngineError;
use crate::fingerprint::fingerprint;
use crate::meta::{MetaCache, PathMeta};
use jmaps_cache::{CacheSession, CacheStore, NewPathVersion, NewResult};
use jmaps_param::JParam;
use jmaps_path::{Path, PathResult};
use std::path::PathBuf;
use tracing::info;

/// Persist `result`, produced by running `path` against `env`, under
/// `result_dir`. Refreshes `meta` when `use_meta_cache` is set.
pub fn save<S: CacheStore>(
    store: &mut S,
    meta: &mut MetaCache,
    use_meta_cache: bool,
    result_dir: &std::path::Path,
    env: &mut JParam,
    path: &dyn Path,
    result: &PathResult,
) -> Result<(), EngineError> {
    let name = path.name();
    let env_sql = env.get_sql_data(false, false, false)?;
    let env_schema_map = env.get_sql_data(false, false, true)?;
    let env_schema = serde_json::to_value(&env_schema_map)?;

    let digest = fingerprint(&env_sql)?;
    let base_dir = result_dir.join(name);
    std::fs::create_dir_all(&base_dir)?;
    let base_path: PathBuf = base_dir.join(digest);

    let file_schema_map = result.to_file(&base_path)?;
    let file_schema = file_schema_map.as_ref().map(serde_json::to_value).transpose()?;
    let file_path = file_schema_map.as_ref().map(|_| base_path.to_string_lossy().into_owned());

    let mut session = store.session()?;

    let version = match session.find_path_version_by_schema(name, &env_schema, file_schema.as_ref())? {
        Some(v) => v,
        None => {
            let version = session.insert_path_version(NewPathVersion {
                name: name.to_string(),
                changelog: path.changelog().map(str::to_string),
                env_schema: env_schema.clone(),
                file_schema: file_schema.clone(),
            })?;
            info!(target: "jmaps::engine", path = name, version, "path version bumped");
            version
        }
    };
    session.upsert_path(name, version)?;

    let environment = serde_json::to_value(&env_sql)?;
    let sql = result.sql().map(serde_json::to_value).transpose()?;
    let new_result = NewResult {
        path_name: name.to_string(),
        path_version: version,
        environment,
        sql,
        file_path,
    };

    if path.save_datetime() {
        session.insert_timestamped_result(new_result)?;
        info!(target: "jmaps::engine", path = name, version, "timestamped result row inserted");
    } else {
        session.upsert_result(new_result)?;
        info!(target: "jmaps::engine", path = name, version, "result row upserted");
    }

    session.commit()?;

    if use_meta_cache {
        meta.put(
            name,
            PathMeta {
                current_version: version,
                env_schema,
                file_schema,
            },
        );
    }

    Ok(())
}
