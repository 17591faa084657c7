//! Logging setup for the Rondo node.
//!
//! The node config carries two strings: `log_format` ("json" selects
//! newline-delimited JSON for aggregation pipelines, anything else gets
//! human-readable lines) and `log_level` (an `EnvFilter` directive such as
//! `"info"` or `"debug,rondo_voting=trace"`). A `RUST_LOG` environment
//! variable overrides the configured level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber from the node config's `log_format`
/// and `log_level` strings.
///
/// # Panics
///
/// Panics if a global subscriber has already been set (i.e. this function
/// was called twice in the same process).
pub fn init_logging(format: &str, level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
