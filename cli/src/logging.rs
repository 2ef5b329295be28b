//! Support for tracing execution of the CLI.

use tracing_subscriber::{fmt::Subscriber, prelude::*, EnvFilter};

/// Filter used when neither `--log-level` nor `RUST_LOG` is set.
const DEFAULT_FILTER: &str = "info";

/// Set up the `tracing` library, logging to stderr.
///
/// `level` takes precedence over `RUST_LOG`. An unparsable filter falls back
/// to the default so that a typo never hides every log line.
pub fn initialize_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .finish()
        .init();
}
