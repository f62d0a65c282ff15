//! Tracing setup

use crate::error::ClientError;
use tracing_subscriber::EnvFilter;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `default_directive` when set and valid.
///
/// # Errors
/// `ClientError::Telemetry` if a global subscriber is already installed.
pub fn init_tracing(default_directive: &str, format: LogFormat) -> Result<(), ClientError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| ClientError::Telemetry(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_reported() {
        let _ = init_tracing("debug", LogFormat::Pretty);
        let err = init_tracing("debug", LogFormat::Json).unwrap_err();
        assert!(matches!(err, ClientError::Telemetry(_)));
    }
}
