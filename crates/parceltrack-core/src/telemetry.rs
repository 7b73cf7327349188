use tracing_subscriber::EnvFilter;

/// Installs the process-wide fmt subscriber, honoring `RUST_LOG`. Safe to
/// call more than once; later calls are ignored.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
