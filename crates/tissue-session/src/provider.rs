//! Identity-provider capability
//!
//! The provider SDK is opaque to this crate. Implement [`IdentityProvider`] to
//! plug one in; the session manager only relies on the operations below.

use crate::error::ProviderError;
use crate::state::{Session, User};
use tokio::sync::{broadcast, watch};

/// Request for a bearer credential
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRequest {
    /// Named token template, if any
    pub template: Option<String>,
}

impl TokenRequest {
    /// Request a default-scoped token
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope the token to a named template
    #[inline]
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }
}

/// Notification that the provider's user or session changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChange {
    /// User after the change
    pub user: Option<User>,
    /// Session after the change
    pub session: Option<Session>,
}

impl SessionChange {
    /// Change describing a sign-out
    #[inline]
    #[must_use]
    pub fn signed_out() -> Self {
        Self {
            user: None,
            session: None,
        }
    }
}

/// External identity provider
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Whether the provider runtime is present and can be loaded
    fn is_available(&self) -> bool;

    /// Load-completion signal, for providers that publish one
    ///
    /// When `None`, the session manager falls back to polling
    /// [`is_available`](Self::is_available).
    fn load_signal(&self) -> Option<watch::Receiver<bool>> {
        None
    }

    /// Load the provider with its publishable key
    async fn load(&self, publishable_key: &str) -> Result<(), ProviderError>;

    /// Currently signed-in user
    fn current_user(&self) -> Option<User>;

    /// Currently active session
    fn current_session(&self) -> Option<Session>;

    /// Subscribe to user/session change notifications
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;

    /// Issue a bearer token for the active session
    ///
    /// Returns `Ok(None)` when the provider has no session to issue for.
    async fn get_token(&self, request: &TokenRequest) -> Result<Option<String>, ProviderError>;

    /// End the provider session
    async fn sign_out(&self) -> Result<(), ProviderError>;
}
