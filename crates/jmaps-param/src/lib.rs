//! The JourneyMAPS parameter tree
//!
//! A [`JParam`] tree is the hierarchical environment a path is run
//! against: plain values, ordered dicts, memoized buffers, and
//! late-bound references, all carrying usage flags so that a path's
//! cache fingerprint only ever reflects the parameters it actually
//! touched.

mod error;
mod node;
mod sql_projection;

pub use error::ParamError;
pub use jmaps_core::{JValue, SqlType};
pub use node::{BufferFn, JParam, ResetCondition};
