//! The type-keyed writer/reader registry.
//!
//! Mirrors a small multiple-dispatch system: a writer is looked up by
//! walking a value's declared ancestor chain (nearest first) the same way
//! a method-resolution order would, while a reader is looked up by exact
//! type key only, since the caller already knows which type a file was
//! written as (it's recorded in the path's `file_schema`).

use crate::error::IoError;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// The string under which a type is registered. Types that want
/// ancestor-based writer fallback list their ancestors' keys alongside
/// their own in [`FileObject::ancestor_keys`], nearest first.
pub type TypeKey = &'static str;

/// A value that can be written through the IO registry.
///
/// `type_key` identifies the concrete type; `ancestor_keys` additionally
/// lists any more general keys a writer might be registered under
/// (commonly just `[Self::type_key()]` when there's no hierarchy to
/// speak of). Resolution tries these in order and stops at the first
/// match.
pub trait FileObject: Any + Send + Sync {
    /// This value's own type key.
    fn type_key(&self) -> TypeKey;

    /// `type_key()` followed by any more general keys to fall back to.
    fn ancestor_keys(&self) -> Vec<TypeKey> {
        vec![self.type_key()]
    }

    /// Upcast for the writer function to downcast back into a concrete type.
    fn as_any(&self) -> &dyn Any;
}

type WriterFn = Box<dyn Fn(&dyn Any, &Path) -> Result<(), IoError> + Send + Sync>;
type ReaderFn = Box<dyn Fn(&Path) -> Result<Box<dyn FileObject>, IoError> + Send + Sync>;

/// Process-wide registry of writers and readers, keyed by [`TypeKey`].
#[derive(Default)]
pub struct IoRegistry {
    writers: HashMap<TypeKey, WriterFn>,
    readers: HashMap<TypeKey, ReaderFn>,
    resolved_writers: HashMap<TypeKey, TypeKey>,
}

impl IoRegistry {
    /// A fresh, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a writer and reader pair for `type_key`.
    pub fn register(
        &mut self,
        type_key: TypeKey,
        writer: impl Fn(&dyn Any, &Path) -> Result<(), IoError> + Send + Sync + 'static,
        reader: impl Fn(&Path) -> Result<Box<dyn FileObject>, IoError> + Send + Sync + 'static,
    ) {
        self.writers.insert(type_key, Box::new(writer));
        self.resolved_writers.insert(type_key, type_key);
        self.readers.insert(type_key, Box::new(reader));
    }

    /// Write `obj` to `base_path`, walking its ancestor chain for a
    /// writer if one isn't registered for its exact type. Returns the
    /// type key the writer was found under, which callers persist as the
    /// `file_schema` entry for this key.
    pub fn write(&mut self, obj: &dyn FileObject, base_path: &Path) -> Result<TypeKey, IoError> {
        let own_key = obj.type_key();
        if let Some(&resolved) = self.resolved_writers.get(own_key) {
            let writer = self.writers.get(resolved).expect("resolved key always present");
            writer(obj.as_any(), base_path)?;
            return Ok(resolved);
        }

        for candidate in obj.ancestor_keys() {
            if let Some(writer) = self.writers.get(candidate) {
                writer(obj.as_any(), base_path)?;
                self.resolved_writers.insert(own_key, candidate);
                debug!(target: "jmaps::io", own_key, resolved = candidate, "resolved writer via ancestor chain");
                return Ok(candidate);
            }
        }

        Err(IoError::NoHandler {
            type_key: own_key.to_string(),
        })
    }

    /// Read a value of the declared type back from `base_path`. Takes the
    /// type key by `&str` rather than `TypeKey` since it's typically read
    /// out of a persisted schema (an owned `String`), not a `'static`
    /// constant.
    pub fn read(&self, type_key: &str, base_path: &Path) -> Result<Box<dyn FileObject>, IoError> {
        let reader = self.readers.get(type_key).ok_or_else(|| IoError::NoHandler {
            type_key: type_key.to_string(),
        })?;
        reader(base_path)
    }
}

/// The process-wide registry. Writers/readers are expected to be
/// registered once during initialization (see [`crate::builtin::register_builtins`]);
/// after that, lookups are read-mostly.
pub static GLOBAL_REGISTRY: Lazy<Mutex<IoRegistry>> = Lazy::new(|| Mutex::new(IoRegistry::new()));

/// Register a handler pair in the global registry.
pub fn register(
    type_key: TypeKey,
    writer: impl Fn(&dyn Any, &Path) -> Result<(), IoError> + Send + Sync + 'static,
    reader: impl Fn(&Path) -> Result<Box<dyn FileObject>, IoError> + Send + Sync + 'static,
) {
    GLOBAL_REGISTRY.lock().register(type_key, writer, reader);
}

/// Write `obj` through the global registry.
pub fn write(obj: &dyn FileObject, base_path: &Path) -> Result<TypeKey, IoError> {
    GLOBAL_REGISTRY.lock().write(obj, base_path)
}

/// Read a value of the declared type through the global registry.
pub fn read(type_key: &str, base_path: &Path) -> Result<Box<dyn FileObject>, IoError> {
    GLOBAL_REGISTRY.lock().read(type_key, base_path)
}
