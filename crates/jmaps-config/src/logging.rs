//! Process-wide logging setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Install a `tracing` subscriber writing to stderr.
///
/// Honors `RUST_LOG` if set; otherwise defaults to `info`, or `debug` for
/// the `jmaps` crates when `verbose` is set. Safe to call more than once;
/// later calls are no-ops.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "info,jmaps_core=debug,jmaps_param=debug,jmaps_io=debug,jmaps_path=debug,jmaps_cache=debug,jmaps_engine=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
