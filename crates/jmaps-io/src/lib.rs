//! The IO registry: type-keyed writer/reader dispatch for the large,
//! opaque outputs a path wants persisted to disk alongside the
//! relational cache store.
//!
//! Writers are resolved by walking a value's declared ancestor chain
//! (nearest first) and memoizing the match; readers are resolved by
//! exact type key, since the caller already knows the declared type
//! from a path version's `file_schema`.

mod builtin;
mod error;
mod registry;

pub use builtin::{register_builtins, BytesPayload, JsonPayload};
pub use error::IoError;
pub use registry::{read, register, write, FileObject, IoRegistry, TypeKey, GLOBAL_REGISTRY};
