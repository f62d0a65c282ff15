//! Testing utilities for the Digital Tissue workspace
//!
//! Scripted identity provider, session wiring and backend fixtures.

#![allow(missing_docs)]

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tissue_session::{
    IdentityProvider, ProviderError, Session, SessionChange, SessionConfig, SessionManager,
    TokenRequest, User,
};
use tokio::sync::{broadcast, watch};

pub const PUBLISHABLE_KEY: &str = "pk_test_dGlzc3VlLmRldiQ";
pub const TEST_TOKEN: &str = "test-session-token";

/// In-memory identity provider with call counters
#[derive(Debug)]
pub struct FakeProvider {
    available: AtomicBool,
    load_signal: Mutex<Option<watch::Sender<bool>>>,
    load_delay: Option<Duration>,
    load_error: Option<ProviderError>,
    token_error: Option<ProviderError>,
    sign_out_error: Option<ProviderError>,
    token: Mutex<Option<String>>,
    user: Mutex<Option<User>>,
    session: Mutex<Option<Session>>,
    changes: broadcast::Sender<SessionChange>,
    load_calls: AtomicUsize,
    token_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
    loaded_keys: Mutex<Vec<String>>,
    token_requests: Mutex<Vec<TokenRequest>>,
}

impl FakeProvider {
    fn with_state(user: Option<User>, session: Option<Session>) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            available: AtomicBool::new(true),
            load_signal: Mutex::new(None),
            load_delay: None,
            load_error: None,
            token_error: None,
            sign_out_error: None,
            token: Mutex::new(Some(TEST_TOKEN.to_string())),
            user: Mutex::new(user),
            session: Mutex::new(session),
            changes,
            load_calls: AtomicUsize::new(0),
            token_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
            loaded_keys: Mutex::new(Vec::new()),
            token_requests: Mutex::new(Vec::new()),
        }
    }

    /// Provider with `sample_user` signed in
    #[must_use]
    pub fn signed_in() -> Self {
        Self::with_state(Some(sample_user()), Some(sample_session()))
    }

    /// Provider with a specific user and session
    #[must_use]
    pub fn signed_in_as(user: User, session: Session) -> Self {
        Self::with_state(Some(user), Some(session))
    }

    /// Provider with nobody signed in
    #[must_use]
    pub fn signed_out() -> Self {
        Self::with_state(None, None)
    }

    /// Runtime not present until [`make_available`](Self::make_available)
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.available = AtomicBool::new(false);
        self
    }

    /// Publish a load-completion signal
    #[must_use]
    pub fn with_load_signal(mut self) -> Self {
        let (tx, _rx) = watch::channel(self.available.load(Ordering::SeqCst));
        self.load_signal = Mutex::new(Some(tx));
        self
    }

    /// Make `load` take this long
    #[must_use]
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    /// Make `load` fail
    #[must_use]
    pub fn failing_load(mut self, message: &str) -> Self {
        self.load_error = Some(ProviderError::Load(message.to_string()));
        self
    }

    /// Make `get_token` fail
    #[must_use]
    pub fn failing_token(mut self, message: &str) -> Self {
        self.token_error = Some(ProviderError::Token(message.to_string()));
        self
    }

    /// Make `sign_out` fail
    #[must_use]
    pub fn failing_sign_out(mut self, message: &str) -> Self {
        self.sign_out_error = Some(ProviderError::SignOut(message.to_string()));
        self
    }

    /// Token handed out for signed-in sessions; `None` issues nothing
    #[must_use]
    pub fn with_token(self, token: Option<&str>) -> Self {
        *self.token.lock() = token.map(str::to_string);
        self
    }

    /// Bring the runtime up, firing the load signal if there is one
    pub fn make_available(&self) {
        self.available.store(true, Ordering::SeqCst);
        if let Some(signal) = self.load_signal.lock().as_ref() {
            signal.send_replace(true);
        }
    }

    /// Drop the load signal sender without ever firing it
    pub fn close_load_signal(&self) {
        self.load_signal.lock().take();
    }

    /// Change the signed-in state and notify subscribers
    pub fn emit_change(&self, user: Option<User>, session: Option<Session>) {
        *self.user.lock() = user.clone();
        *self.session.lock() = session.clone();
        let _ = self.changes.send(SessionChange { user, session });
    }

    /// Sign out from the provider side
    pub fn emit_sign_out(&self) {
        self.emit_change(None, None);
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    /// Keys passed to `load`, in call order
    pub fn loaded_keys(&self) -> Vec<String> {
        self.loaded_keys.lock().clone()
    }

    /// Templates requested from `get_token`, in call order
    pub fn token_templates(&self) -> Vec<Option<String>> {
        self.token_requests
            .lock()
            .iter()
            .map(|request| request.template.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FakeProvider {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn load_signal(&self) -> Option<watch::Receiver<bool>> {
        self.load_signal.lock().as_ref().map(watch::Sender::subscribe)
    }

    async fn load(&self, publishable_key: &str) -> Result<(), ProviderError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        self.loaded_keys.lock().push(publishable_key.to_string());
        if let Some(delay) = self.load_delay {
            tokio::time::sleep(delay).await;
        }
        match &self.load_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn current_user(&self) -> Option<User> {
        self.user.lock().clone()
    }

    fn current_session(&self) -> Option<Session> {
        self.session.lock().clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }

    async fn get_token(&self, request: &TokenRequest) -> Result<Option<String>, ProviderError> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        self.token_requests.lock().push(request.clone());
        if let Some(err) = &self.token_error {
            return Err(err.clone());
        }
        if self.session.lock().is_none() {
            return Ok(None);
        }
        Ok(self.token.lock().clone())
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.sign_out_error {
            return Err(err.clone());
        }
        self.emit_sign_out();
        Ok(())
    }
}

pub fn sample_user() -> User {
    User::new("user_2abc").with_email("architect@tissue.dev")
}

pub fn sample_session() -> Session {
    Session::new("sess_2xyz").for_user("user_2abc")
}

/// Session config with the fixture key and short provider timings
pub fn session_config() -> SessionConfig {
    SessionConfig::new()
        .with_publishable_key(PUBLISHABLE_KEY)
        .with_poll_interval(Duration::from_millis(50))
        .with_provider_timeout(Duration::from_secs(5))
}

pub fn session_manager(provider: &Arc<FakeProvider>) -> SessionManager {
    SessionManager::new(Arc::clone(provider) as Arc<dyn IdentityProvider>, session_config())
}

/// Latest-metrics payload as the backend serves it
pub fn sample_metrics() -> Value {
    json!({
        "daylight_potential": {
            "slug": "daylight_potential",
            "name": "daylight_potential",
            "total_value": 0.31,
            "benchmark": 0.2,
            "value_per_level": {"0": 0.28, "1": 0.34},
            "viewer_filter": "windows"
        },
        "green_space_index": {
            "slug": "green_space_index",
            "total_value": 0.72,
            "benchmark": 0.6,
            "value_per_cluster": {"north": 0.8, "south": null}
        },
        "carbon_efficiency": {
            "slug": "carbon_efficiency",
            "total_value": null,
            "benchmark": 0.5,
            "chart_data": "ChartData(label='Carbon by material', values={})"
        }
    })
}

/// History payload in list form
pub fn sample_history() -> Value {
    json!([
        {"version_id": "a1b2c3", "created_at": "2024-05-01T10:00:00Z"},
        {"version_id": "d4e5f6", "created_at": "2024-05-02T09:30:00Z"}
    ])
}

/// KPI groups mixing the three reference encodings
pub const SAMPLE_KPI_YAML: &str = r"
- name: Environment
  icon: leaf
  metrics: [daylight_potential, green_space_index]
- name: Carbon
  metrics:
    carbon_efficiency: true
    envelope_efficiency: true
- name: Program
  metrics:
    - slug: program_diversity_index
";
