//! Logging and tracing bootstrap.

use anyhow::anyhow;
use staybook_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` wins, otherwise the configured directive.
fn env_filter(settings: &TelemetrySettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.filter))
}

/// Install the global tracing subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(settings));

    let result = match settings.log_format {
        LogFormat::Pretty => builder.with_target(true).try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };

    result.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    tracing::debug!(
        target: "staybook-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}
