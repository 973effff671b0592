//! Logging setup
//!
//! Diagnostics go to stderr: stdout belongs to the data plane (relayed
//! bytes in one-shot mode, the accept/close event lines in server mode).

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Initialize the stderr subscriber
///
/// The level comes from `RUST_LOG`, defaulting to "info".
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(env_filter),
        )
        .init();
}
