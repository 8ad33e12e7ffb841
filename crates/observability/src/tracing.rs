//! JSON log subscriber.
//!
//! Events carry their structured fields (`expense_id`, `group_id`, `residue`,
//! ...) as JSON keys, so settlement warnings can be filtered downstream
//! without parsing messages.

use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, or `fallback` if that is unset or invalid.
///
/// An invalid `fallback` degrades to `info`.
pub fn filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(fallback: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(fallback))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
