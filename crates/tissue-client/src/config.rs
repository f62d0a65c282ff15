//! Client configuration
//!
//! Loaded from the process environment or a TOML file:
//!
//! | variable | field |
//! |---|---|
//! | `TISSUE_API_URL` | `api_url` |
//! | `TISSUE_PUBLISHABLE_KEY` | `session.publishable_key` |
//! | `TISSUE_SKIP_AUTH` | `skip_auth` (only the exact value `true` enables it) |
//! | `TISSUE_REQUEST_TIMEOUT_MS` | `request_timeout_ms` |

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tissue_session::{AuthBypass, AuthRedirects, SessionConfig};

pub const ENV_API_URL: &str = "TISSUE_API_URL";
pub const ENV_PUBLISHABLE_KEY: &str = "TISSUE_PUBLISHABLE_KEY";
pub const ENV_SKIP_AUTH: &str = "TISSUE_SKIP_AUTH";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "TISSUE_REQUEST_TIMEOUT_MS";

/// Dashboard client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend API base URL
    pub api_url: String,
    /// Development-only authentication bypass
    pub skip_auth: bool,
    /// Per-request timeout; none by default
    pub request_timeout_ms: Option<u64>,
    /// Identity-provider settings
    pub session: SessionConfig,
    /// Sign-in / sign-out destinations
    pub redirects: AuthRedirects,
}

impl ClientConfig {
    /// Create configuration for an API base URL
    #[inline]
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// With identity-provider settings
    #[inline]
    #[must_use]
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// With development auth bypass
    #[inline]
    #[must_use]
    pub fn with_skip_auth(mut self, skip_auth: bool) -> Self {
        self.skip_auth = skip_auth;
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Load from the process environment
    ///
    /// # Errors
    /// Missing API URL or malformed values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup
    ///
    /// # Errors
    /// Missing API URL or malformed values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::new(lookup(ENV_API_URL).unwrap_or_default());

        if let Some(key) = lookup(ENV_PUBLISHABLE_KEY) {
            config.session = config.session.with_publishable_key(key);
        }
        config.skip_auth = lookup(ENV_SKIP_AUTH).is_some_and(|flag| flag == "true");
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid(ENV_REQUEST_TIMEOUT_MS, e.to_string()))?;
            config.request_timeout_ms = Some(millis);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse TOML configuration
    ///
    /// # Errors
    /// Malformed TOML or invalid values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read TOML configuration from disk
    ///
    /// # Errors
    /// Unreadable file, malformed TOML or invalid values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Check the configuration is usable
    ///
    /// A missing publishable key is not an error here; the session
    /// bootstrap reports it when first needed.
    ///
    /// # Errors
    /// Empty API URL or zero request timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Missing(ENV_API_URL));
        }
        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::invalid(
                ENV_REQUEST_TIMEOUT_MS,
                "timeout must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Bypass as configured
    #[inline]
    #[must_use]
    pub fn bypass(&self) -> AuthBypass {
        AuthBypass::requested(self.skip_auth)
    }

    /// Request timeout, if any
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}
