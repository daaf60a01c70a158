//! # Structured Logging Module
//!
//! Console logging using the tracing ecosystem. Logs go to stdout so the
//! coordinator runs cleanly in containers.
//!
//! - Filter from `RUST_LOG`, falling back to the configured level
//! - TTY-aware ANSI color output
//! - Optional JSON lines for log shippers (`logging.format = "json"`)
//!
//! Initialization is idempotent. A subscriber installed earlier (for example
//! by a test harness) is left in place.

use crate::config::{LogFormat, LoggingConfig};
use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the global subscriber once per process
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGING_INITIALIZED.get_or_init(|| {
        let filter = build_filter(config);
        let use_ansi = IsTerminal::is_terminal(&std::io::stdout());

        let (pretty, json) = match config.format {
            LogFormat::Pretty => (
                Some(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_level(true)
                        .with_ansi(use_ansi),
                ),
                None,
            ),
            LogFormat::Json => (
                None,
                Some(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_current_span(true),
                ),
            ),
        };

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(pretty)
            .with(json);

        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized, keeping the existing one"
            );
        } else {
            tracing::info!(
                format = ?config.format,
                ansi_colors = use_ansi,
                "Structured logging initialized"
            );
        }
    });
}

/// `RUST_LOG` wins; otherwise the configured level, otherwise `info`
fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
