//! Runtime options controlling a single `run` invocation.

use crate::error::PathError;
use serde::{Deserialize, Serialize};

/// Options threaded through a `run` call and every recursive subpath
/// invocation it spawns.
///
/// Unknown keys fail validation rather than being silently ignored —
/// construct from untrusted input with [`PathOptions::from_json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PathOptions {
    /// How many additional levels of the subpath graph to force a fresh
    /// run for, ignoring a cache hit at this level. `0` means "use the
    /// cache if available".
    pub force_run_to_depth: u32,
    /// Skip both cache lookups and cache writes entirely.
    pub disable_saving_and_loading: bool,
    /// Invoke each path's `plot` hook after it runs.
    pub plot: bool,
    /// Emit verbose progress output.
    pub verbose: bool,
    /// Show a progress bar while iterating a batched subpath.
    pub batch_tqdm: bool,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            force_run_to_depth: 0,
            disable_saving_and_loading: false,
            plot: true,
            verbose: false,
            batch_tqdm: false,
        }
    }
}

impl PathOptions {
    /// Parse options from a JSON object, rejecting unrecognized keys.
    pub fn from_json(value: serde_json::Value) -> Result<Self, PathError> {
        serde_json::from_value(value).map_err(|e| PathError::UnknownOption { name: e.to_string() })
    }

    /// The options a subpath is run with: one level shallower than `self`.
    pub fn for_subpath(&self) -> Self {
        Self {
            force_run_to_depth: self.force_run_to_depth.saturating_sub(1),
            ..*self
        }
    }

    /// Whether, at this depth, a cache hit should be honored instead of
    /// forcing a fresh run.
    pub fn may_use_cache(&self) -> bool {
        self.force_run_to_depth == 0 && !self.disable_saving_and_loading
    }
}
