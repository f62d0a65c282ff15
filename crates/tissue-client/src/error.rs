//! Error types for the dashboard client

use tissue_metrics::{CatalogError, MetricsError};
use tissue_session::SessionError;

/// Problems with client configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required setting absent
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// Setting present but unusable
    #[error("invalid value for {key}: {message}")]
    Invalid {
        key: &'static str,
        message: String,
    },

    /// Config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML
    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConfigError {
    /// Create invalid-value error
    #[inline]
    pub fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            message: message.into(),
        }
    }
}

/// Main client error type
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Telemetry could not be installed
    #[error("failed to initialise tracing: {0}")]
    Telemetry(String),
}

impl ClientError {
    /// Check if the backend simply has nothing to show yet
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Metrics(err) if err.is_not_found())
    }
}
