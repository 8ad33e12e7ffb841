//! Process-wide logging setup shared by every splitledger binary and test
//! harness.

/// Initialize structured logging with the `info` fallback directive.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init("info");
}

/// Initialize structured logging, falling back to `directive` when
/// `RUST_LOG` is unset or unparsable.
pub fn init_with_directive(directive: &str) {
    tracing::init(directive);
}

/// Subscriber construction (filters, formatting).
pub mod tracing;
