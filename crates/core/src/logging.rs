//! Logging infrastructure for the Caduceus assistant.
//!
//! Initializes the tracing subscriber for structured logging. All logs go
//! to stderr so that stdout stays clean for answers and data output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Initialize the tracing subscriber with stderr output.
///
/// Filtering follows `RUST_LOG` unless an explicit level override is given;
/// ANSI colors are suppressed when `no_color` is set or the `NO_COLOR`
/// environment variable is present.
///
/// # Example
/// ```no_run
/// use caduceus_core::logging::init_logging;
///
/// init_logging(None, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level: Option<&str>, no_color: bool) -> AppResult<()> {
    let default_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_str = log_level.unwrap_or(&default_level);

    let env_filter = EnvFilter::try_new(filter_str)
        .map_err(|e| AppError::Config(format!("Invalid log filter: {}", e)))?;

    let ansi = !no_color && std::env::var("NO_COLOR").is_err();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(ansi);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))?;

    Ok(())
}
