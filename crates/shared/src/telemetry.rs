//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogConfig;

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter when set.
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init_tracing(config: &LogConfig) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
