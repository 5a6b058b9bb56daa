//! Logging setup.
//!
//! Structured logging via `tracing`. HTTP-stack modules are held at `warn`
//! so a `debug` run shows screening activity instead of connection-pool
//! chatter. `RUST_LOG`, when set, wins over the configured level.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;

/// Library modules held at `warn` regardless of the configured level.
const QUIET_MODULES: &[&str] = &[
    "hyper",
    "hyper_util",
    "reqwest",
    "h2",
    "rustls",
    "tokio_util",
];

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = QUIET_MODULES
            .iter()
            .fold(String::from(level), |mut acc, module| {
                acc.push_str(&format!(",{}=warn", module));
                acc
            });
        EnvFilter::new(directives)
    })
}

/// Install the global tracing subscriber from observability config.
///
/// Format `"json"` emits one JSON object per line with file/line context;
/// anything else gets the human-readable layer. Safe to call more than
/// once; later calls keep the first subscriber.
pub fn init_logging(config: &ObservabilityConfig) {
    let registry = tracing_subscriber::registry().with(env_filter(&config.log_level));

    if config.log_format == "json" {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        let _ = registry.with(layer).try_init();
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(true);
        let _ = registry.with(layer).try_init();
    }
}
