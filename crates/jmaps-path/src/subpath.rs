//! Results accumulated from a path's subpaths, threaded into its
//! `execute` hook.

use crate::result::PathResult;
use indexmap::IndexMap;

/// What running a single subpath produced: either one result, or — for a
/// batched subpath — one result per batch entry, keyed by batch id.
pub enum SubpathOutcome {
    /// The subpath was run once.
    Single(PathResult),
    /// The subpath was run once per batch entry.
    Batched(IndexMap<String, PathResult>),
}

/// Accumulated subpath outcomes, keyed by subpath name, in the order the
/// subpaths were declared.
pub type SubpathResults = IndexMap<String, SubpathOutcome>;
