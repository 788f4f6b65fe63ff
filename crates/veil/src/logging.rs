//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! embedding application's choice. [`init_logging`] is the convenience for
//! applications that have no subscriber of their own.
//!
//! Events never carry original values or tokens, only categories, counts and
//! namespaces.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{MaskError, Result};

/// Install a global `fmt` subscriber configured by `config`.
///
/// `RUST_LOG` is not consulted; the filter comes from
/// [`LoggingConfig::filter`] (which `VEIL_LOG` overrides via
/// [`crate::config::MaskerConfig::apply_env`]).
///
/// # Errors
///
/// Returns [`MaskError::Config`] if the filter directive is invalid or a
/// global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| MaskError::config(format!("invalid log filter '{}': {e}", config.filter)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_target(true))
            .try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact().with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init(),
    };

    installed.map_err(|_| MaskError::config("a global tracing subscriber is already installed"))
}
