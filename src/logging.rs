//! Log output setup for the command line binary
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary. `RUST_LOG` wins over the configured level when set.

use crate::Settings;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive for the configured level
pub fn filter_directive(settings: &Settings) -> String {
    let level = if settings.debug {
        "debug"
    } else {
        settings.logging.level.as_str()
    };
    format!("warn,phptest={level}")
}

/// Install the global subscriber writing to stderr.
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(settings)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
