use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber honoring `RUST_LOG` (default `warn`).
///
/// Output goes through the test writer so the harness captures it per test.
/// Calling it again, or after another subscriber was installed, does nothing.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
