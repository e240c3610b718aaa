//! `JourneyConfig`: where results live on disk and how aggressively the
//! engine denormalizes cache lookups.

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Configuration for a [`Journey`](https://docs.rs/jmaps-engine) instance.
#[derive(Debug, Clone)]
pub struct JourneyConfig {
    result_dir: PathBuf,
    cache_db_meta: bool,
    default_plot: bool,
}

impl JourneyConfig {
    /// Start building a config. `result_dir` must be set before `build()`.
    pub fn builder() -> JourneyConfigBuilder {
        JourneyConfigBuilder {
            result_dir: None,
            cache_db_meta: true,
            default_plot: true,
        }
    }

    /// Root directory under which `<result_dir>/<path_name>/...` result
    /// files are written.
    pub fn result_dir(&self) -> &Path {
        &self.result_dir
    }

    /// Whether the engine maintains an in-memory denormalization of
    /// `(current_version, env_schema, file_schema)` per path.
    pub fn cache_db_meta(&self) -> bool {
        self.cache_db_meta
    }

    /// The default value of `PathOptions::plot` for runs that don't
    /// override it.
    pub fn default_plot(&self) -> bool {
        self.default_plot
    }
}

/// Fluent builder for [`JourneyConfig`].
#[derive(Debug, Clone)]
pub struct JourneyConfigBuilder {
    result_dir: Option<PathBuf>,
    cache_db_meta: bool,
    default_plot: bool,
}

impl JourneyConfigBuilder {
    /// Override the result directory.
    pub fn result_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.result_dir = Some(path.into());
        self
    }

    /// Enable or disable the in-memory cache-meta denormalization.
    pub fn cache_db_meta(mut self, enabled: bool) -> Self {
        self.cache_db_meta = enabled;
        self
    }

    /// Set the default value of `PathOptions::plot`.
    pub fn default_plot(mut self, enabled: bool) -> Self {
        self.default_plot = enabled;
        self
    }

    /// Finish building. Fails if no `result_dir` was ever set.
    pub fn build(self) -> Result<JourneyConfig, ConfigError> {
        Ok(JourneyConfig {
            result_dir: self.result_dir.ok_or(ConfigError::MissingResultDir)?,
            cache_db_meta: self.cache_db_meta,
            default_plot: self.default_plot,
        })
    }
}
