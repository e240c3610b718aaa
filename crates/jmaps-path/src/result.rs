//! A path's output: a small relational slice plus any large, opaque
//! values persisted to disk through the IO registry.

use crate::error::PathError;
use jmaps_io::{read, write, FileObject};
use std::collections::BTreeMap;
use std::path::Path;

/// A value read out of a [`PathResult`] by key: either a relational
/// scalar or a handle to a file-backed object. Indexing falls back from
/// `sql` to `file`.
pub enum ResultValue<'a> {
    /// A value stored directly in the relational row.
    Sql(&'a serde_json::Value),
    /// A value persisted to disk and read back through the IO registry.
    File(&'a dyn FileObject),
}

/// The output of a path's work: a relational slice plus any file-backed
/// values.
#[derive(Default)]
pub struct PathResult {
    sql: Option<BTreeMap<String, serde_json::Value>>,
    file: Option<BTreeMap<String, Box<dyn FileObject>>>,
}

impl PathResult {
    /// An empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// A result carrying only relational values.
    pub fn with_sql(sql: BTreeMap<String, serde_json::Value>) -> Self {
        Self {
            sql: Some(sql),
            file: None,
        }
    }

    /// A result carrying only file-backed values.
    pub fn with_file(file: BTreeMap<String, Box<dyn FileObject>>) -> Self {
        Self {
            sql: None,
            file: Some(file),
        }
    }

    /// Attach relational values to this result, replacing any already set.
    pub fn set_sql(&mut self, sql: BTreeMap<String, serde_json::Value>) {
        self.sql = Some(sql);
    }

    /// Attach file-backed values to this result, replacing any already set.
    pub fn set_file(&mut self, file: BTreeMap<String, Box<dyn FileObject>>) {
        self.file = Some(file);
    }

    /// The relational slice, if any.
    pub fn sql(&self) -> Option<&BTreeMap<String, serde_json::Value>> {
        self.sql.as_ref()
    }

    /// Look up a value by key, preferring the relational slice and
    /// falling back to the file-backed slice.
    pub fn get(&self, key: &str) -> Option<ResultValue<'_>> {
        if let Some(value) = self.sql.as_ref().and_then(|m| m.get(key)) {
            return Some(ResultValue::Sql(value));
        }
        self.file
            .as_ref()
            .and_then(|m| m.get(key))
            .map(|obj| ResultValue::File(obj.as_ref()))
    }

    /// Write every file entry to `base_path + "_" + key` through the IO
    /// registry, returning the file_schema (`{key: type_written}`), or
    /// `None` if there are no file entries. The schema is recorded as
    /// plain strings since it's persisted as JSON alongside the path
    /// version row.
    pub fn to_file(&self, base_path: &Path) -> Result<Option<BTreeMap<String, String>>, PathError> {
        let Some(file) = &self.file else {
            return Ok(None);
        };
        if file.is_empty() {
            return Ok(None);
        }
        let mut schema = BTreeMap::new();
        for (key, obj) in file.iter() {
            let entry_path = entry_path(base_path, key);
            let type_written = write(obj.as_ref(), &entry_path)?;
            schema.insert(key.clone(), type_written.to_string());
        }
        Ok(Some(schema))
    }

    /// Reconstruct the `file` slice by reading each entry in
    /// `file_schema` back through the IO registry. Leaves `file` empty
    /// when `file_schema` is `None`.
    pub fn from_file(
        mut self,
        base_path: &Path,
        file_schema: Option<&BTreeMap<String, String>>,
    ) -> Result<Self, PathError> {
        let Some(file_schema) = file_schema else {
            return Ok(self);
        };
        let mut file = BTreeMap::new();
        for (key, type_key) in file_schema.iter() {
            let entry_path = entry_path(base_path, key);
            let obj = read(type_key, &entry_path)?;
            file.insert(key.clone(), obj);
        }
        self.file = Some(file);
        Ok(self)
    }
}

fn entry_path(base_path: &Path, key: &str) -> std::path::PathBuf {
    let mut name = base_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push("_");
    name.push(key);
    base_path.with_file_name(name)
}
