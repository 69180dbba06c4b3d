use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured stdout tracing for services. Call once at startup.
/// JSON format with env-filter (`RUST_LOG`, default `info`).
///
/// Later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(fmt::layer().json())
        .try_init();
}

/// Human-readable tracing on stderr for command-line tools, so stdout stays
/// machine-readable. Defaults to `warn`.
pub fn init_cli_tracing() {
    let _ = tracing_subscriber::registry()
        .with(env_filter("warn"))
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
