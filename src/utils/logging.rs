//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::error::{VidpressError, VidpressResult};
use crate::ports::LogLevel;

/// Install the global subscriber writing to stderr.
///
/// `RUST_LOG` wins over `level` when set. Calling this twice is an error.
pub fn init_logging(level: LogLevel, json: bool) -> VidpressResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.with_target(false).try_init()
    };

    installed.map_err(|e| VidpressError::LoggingInitError {
        message: e.to_string(),
    })
}
