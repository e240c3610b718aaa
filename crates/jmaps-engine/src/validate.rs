//! Subpath graph validation: every declared subpath must exist, and the
//! graph they form must be acyclic.

use crate::error::EngineError;
use jmaps_path::Path;
use std::collections::{HashMap, HashSet};

/// Validate the whole subpath graph. Called after every `add_path` /
/// `add_paths`, since a newly added path can both reference existing
/// paths and complete a cycle among them.
pub fn validate_paths(paths: &HashMap<String, Box<dyn Path>>) -> Result<(), EngineError> {
    for (name, path) in paths {
        for sub in path.subpaths() {
            if !paths.contains_key(sub) {
                return Err(EngineError::MissingSubpath {
                    path: name.clone(),
                    missing: sub.clone(),
                });
            }
        }
        for sub in path.batched_subpaths() {
            if !paths.contains_key(sub) {
                return Err(EngineError::MissingSubpath {
                    path: name.clone(),
                    missing: sub.clone(),
                });
            }
        }
    }

    for name in paths.keys() {
        if let Some(cycle) = find_cycle_from(paths, name) {
            return Err(EngineError::CircularSubpath { cycle });
        }
    }

    Ok(())
}

fn find_cycle_from(paths: &HashMap<String, Box<dyn Path>>, start: &str) -> Option<Vec<String>> {
    let mut on_path: HashSet<String> = HashSet::new();
    let mut trail: Vec<String> = Vec::new();
    dfs(paths, start, &mut on_path, &mut trail)
}

fn dfs(
    paths: &HashMap<String, Box<dyn Path>>,
    node: &str,
    on_path: &mut HashSet<String>,
    trail: &mut Vec<String>,
) -> Option<Vec<String>> {
    if on_path.contains(node) {
        trail.push(node.to_string());
        let start = trail.iter().position(|n| n == node).unwrap();
        return Some(trail[start..].to_vec());
    }
    on_path.insert(node.to_string());
    trail.push(node.to_string());

    if let Some(path) = paths.get(node) {
        for sub in path.subpaths() {
            if let Some(cycle) = dfs(paths, sub, on_path, trail) {
                return Some(cycle);
            }
        }
    }

    trail.pop();
    on_path.remove(node);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use jmaps_param::JParam;
    use jmaps_path::{PathResult, SubpathResults};

    struct Stub {
        name: String,
        subpaths: Vec<String>,
    }

    impl Path for Stub {
        fn name(&self) -> &str {
            &self.name
        }
        fn subpaths(&self) -> &[String] {
            &self.subpaths
        }
        fn execute(
            &self,
            _env: &mut JParam,
            _subpath_results: &SubpathResults,
            _verbose: bool,
        ) -> Result<PathResult, jmaps_path::PathError> {
            Ok(PathResult::new())
        }
    }

    fn stub(name: &str, subpaths: &[&str]) -> Box<dyn Path> {
        Box::new(Stub {
            name: name.to_string(),
            subpaths: subpaths.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn missing_subpath_is_rejected() {
        let mut paths: HashMap<String, Box<dyn Path>> = HashMap::new();
        paths.insert("a".to_string(), stub("a", &["ghost"]));
        let err = validate_paths(&paths).unwrap_err();
        assert!(matches!(err, EngineError::MissingSubpath { .. }));
    }

    #[test]
    fn acyclic_graph_passes() {
        let mut paths: HashMap<String, Box<dyn Path>> = HashMap::new();
        paths.insert("a".to_string(), stub("a", &["b"]));
        paths.insert("b".to_string(), stub("b", &[]));
        assert!(validate_paths(&paths).is_ok());
    }

    #[test]
    fn direct_cycle_is_rejected() {
        let mut paths: HashMap<String, Box<dyn Path>> = HashMap::new();
        paths.insert("a".to_string(), stub("a", &["b"]));
        paths.insert("b".to_string(), stub("b", &["a"]));
        let err = validate_paths(&paths).unwrap_err();
        match err {
            EngineError::CircularSubpath { cycle } => {
                assert!(cycle.len() >= 2);
                assert_eq!(cycle.first(), cycle.last());
            }
            other => panic!("expected CircularSubpath, got {other:?}"),
        }
    }

    #[test]
    fn self_loop_is_rejected() {
        let mut paths: HashMap<String, Box<dyn Path>> = HashMap::new();
        paths.insert("a".to_string(), stub("a", &["a"]));
        let err = validate_paths(&paths).unwrap_err();
        assert!(matches!(err, EngineError::CircularSubpath { .. }));
    }
}
