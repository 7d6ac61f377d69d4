use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::cli::Args;

/// Install the process-wide subscriber: stdout `fmt` layer filtered by
/// `RUST_LOG` (falling back to the CLI's `--log-level`), plus
/// `tracing_error::ErrorLayer` so `mudgate_core::Error` values carry a
/// captured span trace when logged.
pub fn init(args: &Args) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(args.log_level.into())
        .from_env_lossy();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();
}
