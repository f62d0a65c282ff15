//! Session manager
//!
//! Owns the authentication session lifecycle:
//! - Lazy, single-flight bootstrap of the identity provider
//! - Reactive session/user state fed by provider notifications
//! - Bearer token issuance
//!
//! The manager is a cheap clone handle. Construct it once at start-up and pass
//! it to whatever needs the session (route guard, metrics client).
//!
//! # Single-flight bootstrap
//!
//! The first caller of [`SessionManager::ensure_session`] installs a shared
//! bootstrap future under a lock and flips the status to `Initializing`
//! before anything is awaited. Every later caller clones that future, so one
//! bootstrap runs no matter how many callers race. Once settled the future
//! keeps its outcome: a failed bootstrap keeps answering with the same error
//! until [`SessionManager::retry`] or [`SessionManager::sign_out`] clears it.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::provider::{IdentityProvider, SessionChange, TokenRequest};
use crate::state::{Session, SessionState, SessionStatus, User};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

type BootstrapFuture = Shared<BoxFuture<'static, Result<SessionState, SessionError>>>;

/// Session lifecycle owner
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    provider: Arc<dyn IdentityProvider>,
    config: SessionConfig,
    cell: Arc<StateCell>,
    /// In-flight or settled bootstrap; `None` until the first call
    bootstrap: Mutex<Option<BootstrapFuture>>,
}

impl SessionManager {
    /// Create manager for a provider
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                config,
                cell: Arc::new(StateCell::new()),
                bootstrap: Mutex::new(None),
            }),
        }
    }

    /// Session configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Snapshot of the current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.cell.snapshot()
    }

    /// Current bootstrap status
    #[inline]
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.inner.cell.status()
    }

    /// Watch session state changes
    #[inline]
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.cell.tx.subscribe()
    }

    /// Whether a session currently exists
    ///
    /// Pure read; never triggers initialisation.
    #[inline]
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.inner.cell.tx.borrow().is_signed_in()
    }

    /// Make sure the provider is loaded and the state is live
    ///
    /// # Errors
    /// - `SessionError::Configuration` if no publishable key is configured
    /// - `SessionError::Timeout` if the provider runtime never appeared
    /// - `SessionError::Provider` if loading the provider failed
    pub async fn ensure_session(&self) -> Result<SessionState, SessionError> {
        let bootstrap = {
            let mut slot = self.inner.bootstrap.lock();
            let current = self.inner.cell.snapshot();
            if current.status == SessionStatus::Ready {
                return Ok(current);
            }

            match slot.as_ref() {
                Some(inflight) => inflight.clone(),
                None => {
                    let bootstrap = Bootstrap {
                        provider: Arc::clone(&self.inner.provider),
                        config: self.inner.config.clone(),
                        cell: Arc::clone(&self.inner.cell),
                    }
                    .run()
                    .boxed()
                    .shared();
                    self.inner
                        .cell
                        .transition(SessionStatus::Initializing, |_| {});
                    *slot = Some(bootstrap.clone());
                    bootstrap
                }
            }
        };

        bootstrap.await
    }

    /// Clear a failed bootstrap and start a new one
    ///
    /// Behaves like [`ensure_session`](Self::ensure_session) in any other status.
    ///
    /// # Errors
    /// Same as [`ensure_session`](Self::ensure_session).
    pub async fn retry(&self) -> Result<SessionState, SessionError> {
        {
            let mut slot = self.inner.bootstrap.lock();
            if self.inner.cell.status() == SessionStatus::Failed {
                tracing::info!("retrying failed session bootstrap");
                self.inner
                    .cell
                    .transition(SessionStatus::Uninitialized, |_| {});
                *slot = None;
            }
        }
        self.ensure_session().await
    }

    /// Bearer token for the active session
    ///
    /// Initialises the session first if needed. Returns `Ok(None)` when
    /// nobody is signed in.
    ///
    /// # Errors
    /// Bootstrap errors, or `SessionError::Provider` if the token request failed.
    pub async fn get_session_token(
        &self,
        template: Option<&str>,
    ) -> Result<Option<String>, SessionError> {
        self.ensure_session().await?;
        if !self.is_signed_in() {
            tracing::debug!("no active session, skipping token request");
            return Ok(None);
        }

        let request = match template {
            Some(template) => TokenRequest::new().with_template(template),
            None => TokenRequest::new(),
        };
        Ok(self.inner.provider.get_token(&request).await?)
    }

    /// Sign out through the provider and reset local state
    ///
    /// A bootstrap still in flight is allowed to settle first.
    ///
    /// # Errors
    /// `SessionError::Provider` if the provider rejected the sign-out; local
    /// state is left untouched in that case.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let inflight = {
            let slot = self.inner.bootstrap.lock();
            if self.inner.cell.status() == SessionStatus::Initializing {
                slot.clone()
            } else {
                None
            }
        };
        if let Some(bootstrap) = inflight {
            let _ = bootstrap.await;
        }

        if self.status() == SessionStatus::Ready {
            self.inner.provider.sign_out().await?;
        }

        self.reset();
        tracing::info!("signed out");
        Ok(())
    }

    fn reset(&self) {
        let mut slot = self.inner.bootstrap.lock();
        self.inner.cell.stop_listener();
        if self.inner.cell.status() != SessionStatus::Uninitialized {
            self.inner
                .cell
                .transition(SessionStatus::Uninitialized, |state| {
                    state.user = None;
                    state.session = None;
                });
        }
        *slot = None;
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.inner.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Session state plus the provider listener feeding it
struct StateCell {
    tx: watch::Sender<SessionState>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl StateCell {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self {
            tx,
            listener: Mutex::new(None),
        }
    }

    fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    fn status(&self) -> SessionStatus {
        self.tx.borrow().status
    }

    /// Move to `to` if legal, applying `apply` in the same update
    fn transition(&self, to: SessionStatus, apply: impl FnOnce(&mut SessionState)) -> bool {
        self.tx.send_if_modified(|state| {
            let from = state.status;
            if !from.can_transition_to(to) {
                tracing::warn!(?from, ?to, "ignoring illegal session transition");
                return false;
            }
            tracing::debug!(?from, ?to, "session transition");
            state.status = to;
            apply(state);
            true
        })
    }

    /// Mirror a provider notification; only meaningful while Ready
    fn apply_change(&self, user: Option<User>, session: Option<Session>) {
        self.tx.send_if_modified(|state| {
            if state.status != SessionStatus::Ready
                || (state.user == user && state.session == session)
            {
                return false;
            }
            tracing::debug!(signed_in = session.is_some(), "provider session changed");
            state.user = user;
            state.session = session;
            true
        });
    }

    fn replace_listener(&self, handle: JoinHandle<()>) {
        if let Some(previous) = self.listener.lock().replace(handle) {
            previous.abort();
        }
    }

    fn stop_listener(&self) {
        if let Some(handle) = self.listener.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for StateCell {
    fn drop(&mut self) {
        self.stop_listener();
    }
}

/// One bootstrap attempt
struct Bootstrap {
    provider: Arc<dyn IdentityProvider>,
    config: SessionConfig,
    cell: Arc<StateCell>,
}

impl Bootstrap {
    async fn run(self) -> Result<SessionState, SessionError> {
        match self.initialise().await {
            Ok(()) => Ok(self.cell.snapshot()),
            Err(err) => {
                tracing::error!(error = %err, "session bootstrap failed");
                self.cell.transition(SessionStatus::Failed, |_| {});
                Err(err)
            }
        }
    }

    async fn initialise(&self) -> Result<(), SessionError> {
        let key = self.config.publishable_key().ok_or_else(|| {
            SessionError::configuration("identity provider publishable key is not set")
        })?;

        self.wait_for_provider().await?;
        self.provider.load(key).await?;

        // Subscribe before reading so no change slips between the two
        let changes = self.provider.subscribe();
        let user = self.provider.current_user();
        let session = self.provider.current_session();
        let signed_in = session.is_some();

        self.cell.replace_listener(tokio::spawn(forward_changes(
            Arc::clone(&self.provider),
            Arc::downgrade(&self.cell),
            changes,
        )));
        self.cell.transition(SessionStatus::Ready, |state| {
            state.user = user;
            state.session = session;
        });

        tracing::info!(signed_in, "identity provider ready");
        Ok(())
    }

    async fn wait_for_provider(&self) -> Result<(), SessionError> {
        if self.provider.is_available() {
            return Ok(());
        }

        tokio::time::timeout(self.config.provider_timeout(), self.until_available())
            .await
            .map_err(|_| SessionError::Timeout {
                waited_ms: self.config.provider_timeout_ms,
            })
    }

    /// Resolves once the provider runtime is present
    ///
    /// Prefers the provider's load signal; polls when there is none or the
    /// signal goes away.
    async fn until_available(&self) {
        if let Some(mut signal) = self.provider.load_signal() {
            let loaded = signal.wait_for(|loaded| *loaded).await.is_ok();
            if loaded {
                return;
            }
            tracing::debug!("provider load signal closed, falling back to polling");
        }

        let mut ticker = tokio::time::interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if self.provider.is_available() {
                return;
            }
        }
    }
}

/// Keep the state cell in step with provider notifications
async fn forward_changes(
    provider: Arc<dyn IdentityProvider>,
    cell: Weak<StateCell>,
    mut changes: broadcast::Receiver<SessionChange>,
) {
    loop {
        let change = match changes.recv().await {
            Ok(change) => change,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "session notifications lagged, resyncing");
                SessionChange {
                    user: provider.current_user(),
                    session: provider.current_session(),
                }
            }
            Err(RecvError::Closed) => break,
        };

        let Some(state) = cell.upgrade() else { break };
        state.apply_change(change.user, change.session);
    }
}
