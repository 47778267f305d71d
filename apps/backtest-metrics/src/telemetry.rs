//! Tracing setup.
//!
//! Initializes a `tracing-subscriber` formatter with an environment filter.
//!
//! # Configuration
//!
//! - `RUST_LOG`: filter directives; when unset, `backtest_metrics=<level>`
//!   with the level from the logging configuration
//! - `observability.logging.format`: `pretty` (console) or `json`
//!
//! # Usage
//!
//! ```rust,ignore
//! use backtest_metrics::telemetry::init_telemetry;
//!
//! let config = load_config(None)?;
//! init_telemetry(&config.observability.logging);
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Filter used when `RUST_LOG` is unset.
#[must_use]
pub fn default_filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_new(format!("backtest_metrics={}", logging.level))
        .unwrap_or_else(|_| EnvFilter::new("backtest_metrics=info"))
}

/// Install the global subscriber.
///
/// A subscriber that is already installed (tests, embedding applications)
/// is left in place.
pub fn init_telemetry(logging: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(logging));

    let installed = if logging.is_json() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_current_span(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .try_init()
    };

    if let Err(e) = installed {
        eprintln!("Tracing subscriber already installed: {e}");
    }
}
