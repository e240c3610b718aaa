//! Default handlers for the two shapes most path results reach for:
//! arbitrary JSON-serializable payloads and raw byte blobs.
//!
//! Both receive a base path without extension and choose their own
//! suffix, per the registry's contract: `write` picks the extension,
//! `read` is only ever called against the same declared type so it
//! knows what to look for.

use crate::error::IoError;
use crate::registry::{register, FileObject, TypeKey};
use std::any::Any;
use std::path::Path;

/// An arbitrary JSON-serializable value, written as `<base_path>.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPayload(pub serde_json::Value);

impl FileObject for JsonPayload {
    fn type_key(&self) -> TypeKey {
        "jmaps::JsonPayload"
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An opaque byte blob, written as `<base_path>.bin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesPayload(pub Vec<u8>);

impl FileObject for BytesPayload {
    fn type_key(&self) -> TypeKey {
        "jmaps::BytesPayload"
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn json_extension(base_path: &Path) -> std::path::PathBuf {
    base_path.with_extension("json")
}

fn bytes_extension(base_path: &Path) -> std::path::PathBuf {
    base_path.with_extension("bin")
}

/// Register the built-in [`JsonPayload`]/[`BytesPayload`] handlers in the
/// global registry. Call once during process initialization, before any
/// path results are saved or loaded.
pub fn register_builtins() {
    register(
        "jmaps::JsonPayload",
        |obj, base_path| {
            let payload = obj.downcast_ref::<JsonPayload>().expect("type_key resolved to JsonPayload");
            let path = json_extension(base_path);
            let bytes = serde_json::to_vec(&payload.0).map_err(|e| IoError::Codec {
                type_key: "jmaps::JsonPayload".to_string(),
                detail: e.to_string(),
            })?;
            std::fs::write(path, bytes)?;
            Ok(())
        },
        |base_path| {
            let path = json_extension(base_path);
            let bytes = std::fs::read(path)?;
            let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| IoError::Codec {
                type_key: "jmaps::JsonPayload".to_string(),
                detail: e.to_string(),
            })?;
            Ok(Box::new(JsonPayload(value)))
        },
    );

    register(
        "jmaps::BytesPayload",
        |obj, base_path| {
            let payload = obj.downcast_ref::<BytesPayload>().expect("type_key resolved to BytesPayload");
            std::fs::write(bytes_extension(base_path), &payload.0)?;
            Ok(())
        },
        |base_path| {
            let bytes = std::fs::read(bytes_extension(base_path))?;
            Ok(Box::new(BytesPayload(bytes)))
        },
    );
}
