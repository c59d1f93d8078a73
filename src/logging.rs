use tracing_subscriber::{EnvFilter, fmt};

/// Logs go to stderr so they never mix with prompts on stdout.
///
/// `RUST_LOG` sets the filter; without it only warnings and errors show.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
