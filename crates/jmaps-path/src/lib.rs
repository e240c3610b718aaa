//! The path abstraction: a named unit of work over a parameter
//! environment, its declared subpath graph, its result shape, and the
//! batching mechanism used to fan a subpath out over many overlays.

mod batch;
mod error;
mod options;
mod path;
mod result;
mod subpath;

pub use batch::Batch;
pub use error::PathError;
pub use options::PathOptions;
pub use path::Path;
pub use result::{PathResult, ResultValue};
pub use subpath::{SubpathOutcome, SubpathResults};
