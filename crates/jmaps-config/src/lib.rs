//! Journey configuration and logging setup.

mod config;
mod error;
mod logging;

pub use config::{JourneyConfig, JourneyConfigBuilder};
pub use error::ConfigError;
pub use logging::init_logging;
