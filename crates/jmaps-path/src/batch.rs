//! A batched subpath's set of environment overlays.

use crate::error::PathError;
use indexmap::IndexMap;
use jmaps_param::JParam;
use std::collections::BTreeMap;
use tracing::warn;

/// A mapping from batch id to an environment overlay (a `Dict`), used
/// when a subpath is run once per entry instead of once overall.
///
/// The first entry inserted defines the batch's `param_schema`; every
/// later entry must project to the same schema or the insert fails.
#[derive(Default)]
pub struct Batch {
    entries: IndexMap<String, JParam>,
    param_schema: Option<BTreeMap<String, serde_json::Value>>,
}

impl Batch {
    /// An empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an overlay under `batch_id`, validating its schema against
    /// the batch's first entry (if any).
    pub fn insert(&mut self, batch_id: impl Into<String>, mut overlay: JParam) -> Result<(), PathError> {
        let batch_id = batch_id.into();
        let schema = overlay.get_sql_data(true, true, true)?;
        match &self.param_schema {
            None => self.param_schema = Some(schema),
            Some(expected) => {
                if expected != &schema {
                    let detail = describe_schema_diff(expected, &schema);
                    warn!(target: "jmaps::path", batch_id = batch_id.as_str(), detail = detail.as_str(), "batch entry schema mismatch");
                    return Err(PathError::BatchSchemaMismatch { batch_id, detail });
                }
            }
        }
        self.entries.insert(batch_id, overlay);
        Ok(())
    }

    /// Number of entries currently in the batch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The schema inferred from the first inserted entry, if any.
    pub fn param_schema(&self) -> Option<&BTreeMap<String, serde_json::Value>> {
        self.param_schema.as_ref()
    }

    /// Iterate entries in insertion order — the order batch execution
    /// must follow.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JParam)> {
        self.entries.iter().map(|(id, overlay)| (id.as_str(), overlay))
    }

    /// Consume the batch, yielding entries in insertion order.
    pub fn into_iter_owned(self) -> impl Iterator<Item = (String, JParam)> {
        self.entries.into_iter()
    }
}

fn describe_schema_diff(
    expected: &BTreeMap<String, serde_json::Value>,
    actual: &BTreeMap<String, serde_json::Value>,
) -> String {
    let mut diffs = Vec::new();
    for (key, expected_tag) in expected {
        match actual.get(key) {
            None => diffs.push(format!("missing key '{key}'")),
            Some(actual_tag) if actual_tag != expected_tag => {
                diffs.push(format!("'{key}': expected {expected_tag}, got {actual_tag}"))
            }
            _ => {}
        }
    }
    for key in actual.keys() {
        if !expected.contains_key(key) {
            diffs.push(format!("unexpected key '{key}'"));
        }
    }
    if diffs.is_empty() {
        "schemas differ".to_string()
    } else {
        diffs.join(", ")
    }
}
