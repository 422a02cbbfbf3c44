//! Telemetry and logging initialization
//!
//! Provides structured logging with `tracing` and `tracing-subscriber`.
//! The host owns stdout, so every log line goes to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is not set
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info,collab_sync::engine=warn"
    }
}

/// Initialize tracing subscriber with appropriate configuration
///
/// # Arguments
/// * `verbose` - If true, sets log level to DEBUG (including per-patch traces)
/// * `json_format` - If true, outputs logs in JSON format for machine parsing
///
/// Returns an error if a global subscriber is already installed.
///
/// # Example
/// ```
/// collab_common::telemetry::init_tracing(false, false).ok();
/// tracing::info!("Collaboration started");
/// ```
pub fn init_tracing(
    verbose: bool,
    json_format: bool,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    if json_format {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            )
            .with(env_filter)
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    static INIT: Once = Once::new();

    #[test]
    fn test_init_tracing() {
        // Only one global subscriber per test binary
        INIT.call_once(|| {
            init_tracing(false, false).unwrap();
        });
        assert!(init_tracing(true, true).is_err());
    }

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter(true), "debug");
        assert!(default_filter(false).starts_with("info"));
    }
}
