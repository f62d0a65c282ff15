//! Error types for the session layer
//!
//! Covers:
//! - Missing identity-provider configuration
//! - Provider runtime never becoming available
//! - Failures reported by the provider itself
//!
//! Every type here is `Clone`: a single bootstrap outcome is handed to every
//! caller that joined it.

/// Failures reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Provider SDK failed to load
    #[error("provider failed to load: {0}")]
    Load(String),

    /// Token could not be issued
    #[error("token request failed: {0}")]
    Token(String),

    /// Sign-out was rejected
    #[error("sign-out failed: {0}")]
    SignOut(String),

    /// Any other provider failure
    #[error("provider error: {0}")]
    Other(String),
}

/// Main session error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Required provider configuration is absent
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Provider runtime did not become available in time
    #[error("identity provider not available after {waited_ms}ms")]
    Timeout {
        /// How long the manager waited
        waited_ms: u64,
    },

    /// Provider reported a failure
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl SessionError {
    /// Create configuration error
    #[inline]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if error is a fatal configuration problem
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if an explicit retry could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Provider(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_error_display() {
        let err = SessionError::Timeout { waited_ms: 5000 };
        assert_eq!(err.to_string(), "identity provider not available after 5000ms");

        let err = SessionError::from(ProviderError::Token("expired".to_string()));
        assert_eq!(err.to_string(), "token request failed: expired");
    }

    #[test]
    fn session_error_classification() {
        assert!(SessionError::configuration("missing key").is_configuration());
        assert!(!SessionError::configuration("missing key").is_retryable());
        assert!(SessionError::Timeout { waited_ms: 1 }.is_retryable());
        assert!(SessionError::Provider(ProviderError::Load("boom".into())).is_retryable());
    }
}
