//! Structured logging setup.

/// Install the global `tracing` subscriber: fmt output, filtered by
/// `RUST_LOG` with a sane default. Safe to call more than once — later
/// calls are no-ops, so tests can call it unconditionally.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beacon=info".into()),
        )
        .try_init();
}
