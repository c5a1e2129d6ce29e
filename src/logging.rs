use tracing_subscriber::EnvFilter;

/// Logs go to stderr so reports on stdout stay clean. `RUST_LOG` overrides the default
/// `warn` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
