use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global subscriber, honoring `UNIKORN_LOG` (falls back to
/// "info") the way the reference CLI honors its own trace-level override.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("UNIKORN_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}
