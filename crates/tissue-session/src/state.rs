//! Client-side view of the authentication session
//!
//! [`SessionStatus`] is a small state machine:
//!
//! ```text
//! Uninitialized → Initializing → Ready ─┐
//!       ↑                      ↘ Failed │
//!       └──────────────────────────┴────┘  (sign-out / explicit retry)
//! ```

use serde::{Deserialize, Serialize};

/// Lifecycle status of the session bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Provider has not been loaded
    #[default]
    Uninitialized,
    /// A bootstrap is in flight
    Initializing,
    /// Provider loaded, state is live
    Ready,
    /// Bootstrap failed; stays here until retried
    Failed,
}

impl SessionStatus {
    /// Statuses reachable from `self` in one step
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [SessionStatus] {
        use SessionStatus::*;
        match self {
            Uninitialized => &[Initializing],
            Initializing => &[Ready, Failed],
            Ready => &[Uninitialized],
            Failed => &[Uninitialized],
        }
    }

    /// Check whether `self → to` is a legal transition
    #[inline]
    #[must_use]
    pub fn can_transition_to(self, to: SessionStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }
}

/// Signed-in user as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Provider user ID
    pub id: String,
    /// Primary email address
    #[serde(default)]
    pub email: Option<String>,
    /// Display name
    #[serde(default)]
    pub full_name: Option<String>,
}

impl User {
    /// Create user with ID only
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            full_name: None,
        }
    }

    /// With email
    #[inline]
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Active provider session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Provider session ID
    pub id: String,
    /// Owning user
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Session {
    /// Create session
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: None,
        }
    }

    /// With owning user
    #[inline]
    #[must_use]
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Snapshot of the session as seen by the client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Bootstrap status
    pub status: SessionStatus,
    /// Current user, if signed in
    pub user: Option<User>,
    /// Current session, if signed in
    pub session: Option<Session>,
}

impl SessionState {
    /// Whether a session exists
    #[inline]
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_path_is_legal() {
        assert!(SessionStatus::Uninitialized.can_transition_to(SessionStatus::Initializing));
        assert!(SessionStatus::Initializing.can_transition_to(SessionStatus::Ready));
        assert!(SessionStatus::Initializing.can_transition_to(SessionStatus::Failed));
        assert!(SessionStatus::Ready.can_transition_to(SessionStatus::Uninitialized));
    }

    #[test]
    fn no_going_backwards() {
        assert!(!SessionStatus::Ready.can_transition_to(SessionStatus::Initializing));
        assert!(!SessionStatus::Failed.can_transition_to(SessionStatus::Ready));
        assert!(!SessionStatus::Initializing.can_transition_to(SessionStatus::Uninitialized));
        assert!(!SessionStatus::Uninitialized.can_transition_to(SessionStatus::Ready));
    }

    #[test]
    fn default_state_is_signed_out() {
        let state = SessionState::default();
        assert_eq!(state.status, SessionStatus::Uninitialized);
        assert!(!state.is_signed_in());
    }
}
