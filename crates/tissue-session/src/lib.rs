//! Tissue Session - identity-provider session lifecycle
//!
//! Gates the dashboard behind a third-party identity provider:
//! - Single-flight bootstrap of the provider runtime
//! - Reactive session/user state
//! - Bearer tokens for backend requests
//! - Route guarding for protected views
//!
//! # Example
//!
//! ```rust,ignore
//! use tissue_session::{NavigationTarget, RouteGuard, SessionConfig, SessionManager};
//!
//! # async fn example(provider: std::sync::Arc<dyn tissue_session::IdentityProvider>) {
//! let config = SessionConfig::new().with_publishable_key("pk_live_...");
//! let session = SessionManager::new(provider, config);
//! let guard = RouteGuard::new(session.clone(), Default::default());
//!
//! let decision = guard.check(&NavigationTarget::protected("/workspace")).await;
//! let token = session.get_session_token(Some("backend")).await;
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod guard;
pub mod manager;
pub mod provider;
pub mod state;

pub use config::{AuthBypass, AuthRedirects, SessionConfig};
pub use error::{ProviderError, SessionError};
pub use guard::{GuardDecision, NavigationTarget, Redirect, RouteGuard, RETURN_PATH_PARAM};
pub use manager::SessionManager;
pub use provider::{IdentityProvider, SessionChange, TokenRequest};
pub use state::{Session, SessionState, SessionStatus, User};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
