use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. Filtering follows `RUST_LOG` and
/// falls back to `info`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
