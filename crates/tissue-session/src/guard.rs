//! Route guard for protected views
//!
//! Navigation targets marked as requiring authentication wait for the session
//! bootstrap and are redirected to sign-in when no session exists. Unmarked
//! targets never touch the session manager.

use crate::config::{AuthBypass, AuthRedirects};
use crate::manager::SessionManager;

/// Query parameter carrying the return path on sign-in redirects
pub const RETURN_PATH_PARAM: &str = "redirect";

/// A navigation the view layer wants to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    /// Full path including query string
    pub full_path: String,
    /// Whether the target view requires a session
    pub requires_auth: bool,
}

impl NavigationTarget {
    /// Target open to everyone
    #[inline]
    #[must_use]
    pub fn public(full_path: impl Into<String>) -> Self {
        Self {
            full_path: full_path.into(),
            requires_auth: false,
        }
    }

    /// Target requiring a session
    #[inline]
    #[must_use]
    pub fn protected(full_path: impl Into<String>) -> Self {
        Self {
            full_path: full_path.into(),
            requires_auth: true,
        }
    }
}

/// Redirect to sign-in, remembering where the user was going
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Destination path
    pub to: String,
    /// Original target, carried as [`RETURN_PATH_PARAM`]
    pub return_path: String,
}

impl Redirect {
    /// Query pairs to append to [`Redirect::to`]
    #[inline]
    #[must_use]
    pub fn query(&self) -> [(&'static str, &str); 1] {
        [(RETURN_PATH_PARAM, self.return_path.as_str())]
    }
}

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Let the navigation happen
    Proceed,
    /// Send the user elsewhere
    Redirect(Redirect),
}

impl GuardDecision {
    /// Whether navigation proceeds
    #[inline]
    #[must_use]
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }
}

/// Guards navigation into protected views
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionManager,
    redirects: AuthRedirects,
    bypass: AuthBypass,
}

impl RouteGuard {
    /// Create guard
    #[inline]
    #[must_use]
    pub fn new(session: SessionManager, redirects: AuthRedirects) -> Self {
        Self {
            session,
            redirects,
            bypass: AuthBypass::disabled(),
        }
    }

    /// With development bypass
    #[inline]
    #[must_use]
    pub fn with_bypass(mut self, bypass: AuthBypass) -> Self {
        self.bypass = bypass;
        self
    }

    /// Configured redirect destinations
    #[inline]
    #[must_use]
    pub fn redirects(&self) -> &AuthRedirects {
        &self.redirects
    }

    /// Decide whether `target` may be entered
    ///
    /// Waits for the session bootstrap when the target is protected.
    pub async fn check(&self, target: &NavigationTarget) -> GuardDecision {
        if !target.requires_auth {
            return GuardDecision::Proceed;
        }
        if self.bypass.is_active() {
            tracing::debug!(path = %target.full_path, "auth bypass active, allowing navigation");
            return GuardDecision::Proceed;
        }

        match self.session.ensure_session().await {
            Ok(_) if self.session.is_signed_in() => GuardDecision::Proceed,
            Ok(_) => {
                tracing::debug!(path = %target.full_path, "no session, redirecting to sign-in");
                self.sign_in_redirect(target)
            }
            Err(err) => {
                tracing::warn!(path = %target.full_path, error = %err, "session unavailable, redirecting to sign-in");
                self.sign_in_redirect(target)
            }
        }
    }

    fn sign_in_redirect(&self, target: &NavigationTarget) -> GuardDecision {
        GuardDecision::Redirect(Redirect {
            to: self.redirects.sign_in_url.clone(),
            return_path: target.full_path.clone(),
        })
    }
}
