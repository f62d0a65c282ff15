//! Session configuration
//!
//! - [`SessionConfig`]: provider key and bootstrap timing
//! - [`AuthRedirects`]: sign-in / sign-out destinations
//! - [`AuthBypass`]: development-only authentication escape hatch

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session bootstrap configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Identity-provider publishable key
    pub publishable_key: Option<String>,
    /// Interval between provider availability probes, in milliseconds
    pub poll_interval_ms: u64,
    /// Maximum wait for the provider runtime, in milliseconds
    pub provider_timeout_ms: u64,
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With publishable key
    #[inline]
    #[must_use]
    pub fn with_publishable_key(mut self, key: impl Into<String>) -> Self {
        self.publishable_key = Some(key.into());
        self
    }

    /// With availability poll interval
    #[inline]
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = duration_ms(interval);
        self
    }

    /// With provider availability timeout
    #[inline]
    #[must_use]
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout_ms = duration_ms(timeout);
        self
    }

    /// Publishable key, ignoring blank values
    #[must_use]
    pub fn publishable_key(&self) -> Option<&str> {
        self.publishable_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Poll interval (never zero)
    #[inline]
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Provider availability timeout
    #[inline]
    #[must_use]
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            publishable_key: None,
            poll_interval_ms: 50,
            provider_timeout_ms: 5_000,
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Authentication redirect destinations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthRedirects {
    /// Sign-in view
    pub sign_in_url: String,
    /// Sign-up view
    pub sign_up_url: String,
    /// Where to land after signing out
    pub after_sign_out_url: String,
    /// Where to land after sign-in when no return path was carried
    pub fallback_redirect_url: String,
}

impl Default for AuthRedirects {
    fn default() -> Self {
        Self {
            sign_in_url: "/sign-in".to_string(),
            sign_up_url: "/sign-up".to_string(),
            after_sign_out_url: "/sign-in".to_string(),
            fallback_redirect_url: "/workspace".to_string(),
        }
    }
}

/// Development-only authentication bypass
///
/// The flag is only honoured in builds with debug assertions; release builds
/// always report it inactive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthBypass(bool);

impl AuthBypass {
    /// Bypass as requested by configuration
    #[inline]
    #[must_use]
    pub fn requested(flag: bool) -> Self {
        Self(flag)
    }

    /// Bypass switched off
    #[inline]
    #[must_use]
    pub fn disabled() -> Self {
        Self(false)
    }

    /// Whether configuration asked for the bypass
    #[inline]
    #[must_use]
    pub fn is_requested(self) -> bool {
        self.0
    }

    /// Whether the bypass is in effect for this build
    #[inline]
    #[must_use]
    pub fn is_active(self) -> bool {
        self.0 && cfg!(debug_assertions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(50));
        assert_eq!(config.provider_timeout(), Duration::from_secs(5));
        assert!(config.publishable_key().is_none());
    }

    #[test]
    fn blank_publishable_key_is_missing() {
        let config = SessionConfig::new().with_publishable_key("   ");
        assert!(config.publishable_key().is_none());

        let config = SessionConfig::new().with_publishable_key(" pk_test_123 ");
        assert_eq!(config.publishable_key(), Some("pk_test_123"));
    }

    #[test]
    fn redirects_default_to_sign_in() {
        let redirects = AuthRedirects::default();
        assert_eq!(redirects.sign_in_url, "/sign-in");
        assert_eq!(redirects.after_sign_out_url, "/sign-in");
        assert_eq!(redirects.fallback_redirect_url, "/workspace");
    }

    #[test]
    fn bypass_follows_build_profile() {
        assert!(!AuthBypass::disabled().is_active());
        assert_eq!(AuthBypass::requested(true).is_active(), cfg!(debug_assertions));
        assert!(AuthBypass::requested(true).is_requested());
    }
}
