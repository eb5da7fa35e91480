//! Process-wide logging initialisation.

use tracing_subscriber::EnvFilter;

/// Initialise the global `tracing` subscriber.
///
/// `level` is the configured `LOG_LEVEL` (e.g. `"info"`, `"debug"`); it is
/// used as the default directive but `RUST_LOG`, if set, still wins, which
/// matches `EnvFilter`'s normal precedence.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .json()
        .init();
}
