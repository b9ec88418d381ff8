//! Tracing subscriber bootstrap.

use bookstore_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this twice
/// is harmless; the second installation is ignored.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .map_err(|err| anyhow::anyhow!("invalid log level '{}': {err}", settings.log_level))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };

    if installed {
        tracing::info!(
            target: "bookstore-telemetry",
            format = ?settings.log_format,
            level = %settings.log_level,
            "telemetry initialized"
        );
    }

    Ok(())
}
