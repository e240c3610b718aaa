//! End-to-end scenarios exercising the Journey engine's cache-driven
//! orchestration: single-path hits, usage-driven fingerprints, batched
//! subpath usage exclusion, version bumps, cycle detection, and
//! output-identity buffers.

use jmaps::cache::{CacheSession, CacheStore, InMemoryCacheStore};
use jmaps::{Batch, JParam, Journey, JourneyConfig, JourneyError, Path, PathOptions, PathResult, ResetCondition};
use jmaps_path::SubpathResults;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn config(dir: &std::path::Path) -> JourneyConfig {
    JourneyConfig::builder().result_dir(dir).build().unwrap()
}

fn int(n: i64) -> JParam {
    JParam::value(n)
}

// --- Scenario A: single-path run, miss then hit -----------------------

struct Double {
    calls: Arc<AtomicUsize>,
}

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
        self.calls.fetch_add(1, Ordering::SeqCst);
        let x = match env.get("x")?.get_value() {
            jmaps::JValue::Int(i) => i,
            _ => 0,
        };
        let mut sql = std::collections::BTreeMap::new();
        sql.insert("y".to_string(), serde_json::json!(x * 2));
        Ok(PathResult::with_sql(sql))
    }
}

#[test]
fn scenario_a_single_path_miss_then_hit() -> Result<(), JourneyError> {
    jmaps::io::register_builtins();
    let dir = tempfile::tempdir().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let env = JParam::dict([("x".to_string(), int(3))]);
    let mut journey = Journey::new(env, config(dir.path()), InMemoryCacheStore::new());
    journey.add_path(Box::new(Double { calls: calls.clone() }))?;

    let first = journey.run("double", PathOptions::default())?;
    assert_eq!(first.sql().unwrap().get("y"), Some(&serde_json::json!(6)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let second = journey.run("double", PathOptions::default())?;
    assert_eq!(second.sql().unwrap().get("y"), Some(&serde_json::json!(6)));
    // second run is a cache hit: execute never ran again
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    Ok(())
}

// --- Scenario B: usage-driven fingerprint ------------------------------

struct ReadsXOnly {
    calls: Arc<AtomicUsize>,
}

impl Path for ReadsXOnly {
    fn name(&self) -> &str {
        "reads_x"
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
        self.calls.fetch_add(1, Ordering::SeqCst);
        let x = match env.get("x")?.get_value() {
            jmaps::JValue::Int(i) => i,
            _ => 0,
        };
        let mut sql = std::collections::BTreeMap::new();
        sql.insert("x_seen".to_string(), serde_json::json!(x));
        Ok(PathResult::with_sql(sql))
    }
}

#[test]
fn scenario_b_fingerprint_depends_only_on_used_parameters() -> Result<(), JourneyError> {
    jmaps::io::register_builtins();
    let dir = tempfile::tempdir().unwrap();
    let store = InMemoryCacheStore::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let env = JParam::dict([("x".to_string(), int(3)), ("y".to_string(), int(9))]);
    let mut journey = Journey::new(env, config(dir.path()), store.clone());
    journey.add_path(Box::new(ReadsXOnly { calls: calls.clone() }))?;
    journey.run("reads_x", PathOptions::default())?;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Persisted environment only ever names the key the path actually read.
    let mut store_handle = store.clone();
    let mut session = store_handle.session().unwrap();
    let version = session.current_version("reads_x").unwrap().unwrap();
    let row = session.path_version("reads_x", version).unwrap().unwrap();
    assert_eq!(row.env_schema, serde_json::json!({"x": "int"}));
    session.commit().unwrap();

    // Changing the unread key doesn't change the fingerprint: still a hit.
    let env2 = JParam::dict([("x".to_string(), int(3)), ("y".to_string(), int(42))]);
    let mut journey2 = Journey::new(env2, config(dir.path()), store);
    journey2.add_path(Box::new(ReadsXOnly { calls: calls.clone() }))?;
    journey2.run("reads_x", PathOptions::default())?;
    assert_eq!(calls.load(Ordering::SeqCst), 1, "changing an unused key must still hit cache");
    Ok(())
}

// --- Scenario C: batched subpath usage exclusion -----------------------

struct ReadsK {
    calls: Arc<AtomicUsize>,
}

impl Path for ReadsK {
    fn name(&self) -> &str {
        "s"
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
        self.calls.fetch_add(1, Ordering::SeqCst);
        let k = match env.get("k")?.get_value() {
            jmaps::JValue::Int(i) => i,
            _ => 0,
        };
        let mut sql = std::collections::BTreeMap::new();
        sql.insert("k_seen".to_string(), serde_json::json!(k));
        Ok(PathResult::with_sql(sql))
    }
}

struct BatchesK {
    calls: Arc<AtomicUsize>,
}

impl Path for BatchesK {
    fn name(&self) -> &str {
        "p"
    }
    fn subpaths(&self) -> &[String] {
        static SUBS: &[String] = &[];
        SUBS
    }
    fn execute(
        &self,
        env: &mut JParam,
        _subpath_results: &SubpathResults,
        _verbose: bool,
    ) -> Result<PathResult, jmaps_path::PathError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let x = match env.get("x")?.get_value() {
            jmaps::JValue::Int(i) => i,
            _ => 0,
        };
        let mut sql = std::collections::BTreeMap::new();
        sql.insert("x_echo".to_string(), serde_json::json!(x));
        Ok(PathResult::with_sql(sql))
    }
}

// `subpaths()`/`get_batches()` need owned storage; this wraps `BatchesK`
// with a fixed subpath list since the trait method returns a borrow.
struct BatchesKWithSub {
    inner: BatchesK,
    subs: Vec<String>,
}

impl Path for BatchesKWithSub {
    fn name(&self) -> &str {
        self.inner.name()
    }
    fn subpaths(&self) -> &[String] {
        &self.subs
    }
    fn execute(
        &self,
        env: &mut JParam,
        subpath_results: &SubpathResults,
        verbose: bool,
    ) -> Result<PathResult, jmaps_path::PathError> {
        self.inner.execute(env, subpath_results, verbose)
    }
    fn get_batches(
        &self,
        _subpath_name: &str,
        _env: &mut JParam,
        _previous_subpath_results: &SubpathResults,
    ) -> Option<Batch> {
        let mut batch = Batch::new();
        batch
            .insert("b", JParam::dict([("k".to_string(), int(1))]))
            .unwrap();
        batch
            .insert("c", JParam::dict([("k".to_string(), int(2))]))
            .unwrap();
        Some(batch)
    }
}

#[test]
fn scenario_c_batched_subpath_usage_is_excluded_from_parent_fingerprint() -> Result<(), JourneyError> {
    jmaps::io::register_builtins();
    let dir = tempfile::tempdir().unwrap();
    let store = InMemoryCacheStore::new();
    let p_calls = Arc::new(AtomicUsize::new(0));
    let s_calls = Arc::new(AtomicUsize::new(0));

    let env = JParam::dict([("x".to_string(), int(5))]);
    let mut journey = Journey::new(env, config(dir.path()), store.clone());
    journey.add_paths([
        Box::new(BatchesKWithSub {
            inner: BatchesK { calls: p_calls.clone() },
            subs: vec!["s".to_string()],
        }) as Box<dyn Path>,
        Box::new(ReadsK { calls: s_calls.clone() }) as Box<dyn Path>,
    ])?;

    journey.run("p", PathOptions::default())?;
    assert_eq!(p_calls.load(Ordering::SeqCst), 1);
    // two batch entries, run once each
    assert_eq!(s_calls.load(Ordering::SeqCst), 2);

    let mut store_handle = store.clone();
    let mut session = store_handle.session().unwrap();
    let version = session.current_version("p").unwrap().unwrap();
    let row = session.path_version("p", version).unwrap().unwrap();
    session.commit().unwrap();

    // "p"'s own fingerprint only ever names `x`; `k` belongs to the
    // batch overlay and to subpath "s", not to "p".
    assert_eq!(row.env_schema, serde_json::json!({"x": "int"}));
    Ok(())
}

// --- Scenario D: version bump on schema change -------------------------

struct EchoesX {
    calls: Arc<AtomicUsize>,
}

impl Path for EchoesX {
    fn name(&self) -> &str {
        "echoes_x"
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
        self.calls.fetch_add(1, Ordering::SeqCst);
        env.get("x")?.get_value();
        Ok(PathResult::with_sql(std::collections::BTreeMap::new()))
    }
}

#[test]
fn scenario_d_schema_change_bumps_path_version() -> Result<(), JourneyError> {
    jmaps::io::register_builtins();
    let dir = tempfile::tempdir().unwrap();
    let store = InMemoryCacheStore::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let env = JParam::dict([("x".to_string(), int(3))]);
    let mut journey = Journey::new(env, config(dir.path()), store.clone());
    journey.add_path(Box::new(EchoesX { calls: calls.clone() }))?;
    journey.run("echoes_x", PathOptions::default())?;

    let mut store_handle = store.clone();
    let mut session = store_handle.session().unwrap();
    let first_version = session.current_version("echoes_x").unwrap().unwrap();
    session.commit().unwrap();

    // same path name, `x` now a string: a new env_schema, hence a new version
    let env2 = JParam::dict([("x".to_string(), JParam::value("three".to_string()))]);
    let mut journey2 = Journey::new(env2, config(dir.path()), store.clone());
    journey2.add_path(Box::new(EchoesX { calls: calls.clone() }))?;
    journey2.run("echoes_x", PathOptions::default())?;

    let mut store_handle = store;
    let mut session = store_handle.session().unwrap();
    let second_version = session.current_version("echoes_x").unwrap().unwrap();
    session.commit().unwrap();

    assert_ne!(first_version, second_version);
    assert_eq!(calls.load(Ordering::SeqCst), 2, "a schema change is never a cache hit");
    Ok(())
}

// --- Scenario E: cycle detection ---------------------------------------

struct StubPath {
    name: String,
    subs: Vec<String>,
}

impl Path for StubPath {
    fn name(&self) -> &str {
        &self.name
    }
    fn subpaths(&self) -> &[String] {
        &self.subs
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

#[test]
fn scenario_e_cycle_detection_reports_the_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let env = JParam::dict(std::iter::empty());
    let mut journey = Journey::new(env, config(dir.path()), InMemoryCacheStore::new());

    let err = journey
        .add_paths([
            Box::new(StubPath {
                name: "a".to_string(),
                subs: vec!["b".to_string()],
            }) as Box<dyn Path>,
            Box::new(StubPath {
                name: "b".to_string(),
                subs: vec!["a".to_string()],
            }) as Box<dyn Path>,
        ])
        .unwrap_err();

    match err {
        JourneyError::CircularSubpath { cycle } => {
            assert_eq!(cycle.first(), cycle.last());
            assert!(cycle.contains(&"a".to_string()));
            assert!(cycle.contains(&"b".to_string()));
        }
        other => panic!("expected CircularSubpath, got {other:?}"),
    }
}

// --- Scenario F: XBuffer identity ---------------------------------------

struct UsesOutputIdentity {
    calls: Arc<AtomicUsize>,
}

impl Path for UsesOutputIdentity {
    fn name(&self) -> &str {
        "output_identity"
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
        self.calls.fetch_add(1, Ordering::SeqCst);
        let out = match env.get("out")?.get_value() {
            jmaps::JValue::Int(i) => i,
            _ => 0,
        };
        let mut sql = std::collections::BTreeMap::new();
        sql.insert("out_seen".to_string(), serde_json::json!(out));
        Ok(PathResult::with_sql(sql))
    }
}

fn env_with_x_buffer(x: i64, parity_only: bool) -> JParam {
    let func: jmaps::BufferFn = if parity_only {
        Arc::new(|args| {
            let x = match args.get("x") {
                Some(jmaps::JValue::Int(i)) => *i,
                _ => 0,
            };
            jmaps::JValue::Int(x % 2)
        })
    } else {
        Arc::new(|args| match args.get("x") {
            Some(jmaps::JValue::Int(i)) => jmaps::JValue::Int(*i),
            _ => jmaps::JValue::Int(0),
        })
    };
    JParam::dict([(
        "out".to_string(),
        JParam::x_buffer("expensive", [("x".to_string(), int(x))], ResetCondition::Never, None, func),
    )])
}

#[test]
fn scenario_f_xbuffer_fingerprint_is_output_not_input() -> Result<(), JourneyError> {
    jmaps::io::register_builtins();
    let dir = tempfile::tempdir().unwrap();
    let store = InMemoryCacheStore::new();
    let calls = Arc::new(AtomicUsize::new(0));

    // x=2 and x=4 both produce parity 0: same output, should be a cache hit.
    let env1 = env_with_x_buffer(2, true);
    let mut journey1 = Journey::new(env1, config(dir.path()), store.clone());
    journey1.add_path(Box::new(UsesOutputIdentity { calls: calls.clone() }))?;
    let first = journey1.run("output_identity", PathOptions::default())?;
    assert_eq!(first.sql().unwrap().get("out_seen"), Some(&serde_json::json!(0)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let env2 = env_with_x_buffer(4, true);
    let mut journey2 = Journey::new(env2, config(dir.path()), store);
    journey2.add_path(Box::new(UsesOutputIdentity { calls: calls.clone() }))?;
    let second = journey2.run("output_identity", PathOptions::default())?;
    assert_eq!(second.sql().unwrap().get("out_seen"), Some(&serde_json::json!(0)));
    assert_eq!(calls.load(Ordering::SeqCst), 1, "same XBuffer output must still hit cache despite different input");
    Ok(())
}
