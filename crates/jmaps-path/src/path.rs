//! The `Path` trait: a named, versionable unit of work over a parameter
//! environment, with a declared subpath graph.

use crate::batch::Batch;
use crate::error::PathError;
use crate::result::PathResult;
use crate::subpath::SubpathResults;
use jmaps_param::JParam;

/// A single node in the experiment graph.
///
/// Implementors declare their subpath dependencies and provide a body
/// (`execute`) that turns an environment plus its subpaths' results into
/// a [`PathResult`]. The engine handles caching, fingerprinting, and
/// recursing into subpaths; a `Path` only needs to describe its own
/// work.
pub trait Path: Send + Sync {
    /// Unique name identifying this path.
    fn name(&self) -> &str;

    /// Human-readable note on what changed since the previous version,
    /// recorded alongside a new `PathVersion` row.
    fn changelog(&self) -> Option<&str> {
        None
    }

    /// When `true`, every successful run appends a new, timestamped
    /// result row instead of being treated as a cacheable, idempotent
    /// computation.
    fn save_datetime(&self) -> bool {
        false
    }

    /// Names of the subpaths this path depends on, in execution order.
    fn subpaths(&self) -> &[String];

    /// Which of `subpaths` are run once per batch entry rather than once
    /// overall.
    fn batched_subpaths(&self) -> &[String] {
        &[]
    }

    /// The path's actual work: given the (already subpath-populated)
    /// environment and the results of its subpaths, produce this path's
    /// result.
    fn execute(
        &self,
        env: &mut JParam,
        subpath_results: &SubpathResults,
        verbose: bool,
    ) -> Result<PathResult, PathError>;

    /// For a batched subpath, build the set of environment overlays to
    /// run it against. Returning `None` means the subpath runs once,
    /// unbatched.
    fn get_batches(
        &self,
        _subpath_name: &str,
        _env: &mut JParam,
        _previous_subpath_results: &SubpathResults,
    ) -> Option<Batch> {
        None
    }

    /// Fire-and-forget hook invoked after a successful run when plotting
    /// is enabled. Errors are not propagated.
    fn plot(&self, _result: &PathResult, _subpath_results: &SubpathResults) {}

    /// Locks `env`, runs [`Path::execute`], and unlocks on every exit
    /// path (success or failure).
    fn run(
        &self,
        env: &mut JParam,
        subpath_results: &SubpathResults,
        verbose: bool,
    ) -> Result<PathResult, PathError> {
        env.lock();
        let outcome = self.execute(env, subpath_results, verbose);
        env.unlock();
        outcome
    }
}
