//! Route guard tests

use pretty_assertions::assert_eq;
use std::sync::Arc;
use tissue_session::{
    AuthBypass, AuthRedirects, GuardDecision, IdentityProvider, NavigationTarget, Redirect,
    RouteGuard, SessionConfig, SessionManager, RETURN_PATH_PARAM,
};
use tissue_test_utils::{session_manager, FakeProvider};

fn guard_for(provider: &Arc<FakeProvider>) -> RouteGuard {
    RouteGuard::new(session_manager(provider), AuthRedirects::default())
}

#[tokio::test(start_paused = true)]
async fn test_public_target_never_touches_session() {
    let provider = Arc::new(FakeProvider::signed_out());
    let guard = guard_for(&provider);

    let decision = guard.check(&NavigationTarget::public("/sign-in")).await;
    assert_eq!(decision, GuardDecision::Proceed);
    assert_eq!(provider.load_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_signed_in_user_enters_protected_view() {
    let provider = Arc::new(FakeProvider::signed_in());
    let guard = guard_for(&provider);

    let decision = guard.check(&NavigationTarget::protected("/workspace")).await;
    assert!(decision.is_proceed());
    assert_eq!(provider.load_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_signed_out_user_is_sent_to_sign_in() {
    let provider = Arc::new(FakeProvider::signed_out());
    let guard = guard_for(&provider);

    let decision = guard
        .check(&NavigationTarget::protected("/workspace?tab=kpi"))
        .await;
    let redirect = match decision {
        GuardDecision::Redirect(redirect) => redirect,
        GuardDecision::Proceed => panic!("expected redirect"),
    };
    assert_eq!(
        redirect,
        Redirect {
            to: "/sign-in".to_string(),
            return_path: "/workspace?tab=kpi".to_string(),
        }
    );
    assert_eq!(redirect.query(), [(RETURN_PATH_PARAM, "/workspace?tab=kpi")]);
}

#[tokio::test(start_paused = true)]
async fn test_bootstrap_failure_redirects_to_sign_in() {
    let provider = Arc::new(FakeProvider::signed_in());
    let session = SessionManager::new(
        Arc::clone(&provider) as Arc<dyn IdentityProvider>,
        SessionConfig::new(),
    );
    let guard = RouteGuard::new(session, AuthRedirects::default());

    let decision = guard.check(&NavigationTarget::protected("/workspace")).await;
    assert!(matches!(decision, GuardDecision::Redirect(ref r) if r.return_path == "/workspace"));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_redirects_to_sign_in() {
    let provider = Arc::new(FakeProvider::signed_in().unavailable());
    let guard = guard_for(&provider);

    let decision = guard.check(&NavigationTarget::protected("/workspace")).await;
    assert!(!decision.is_proceed());
}

#[tokio::test(start_paused = true)]
async fn test_custom_sign_in_url_is_used() {
    let provider = Arc::new(FakeProvider::signed_out());
    let redirects = AuthRedirects {
        sign_in_url: "/login".to_string(),
        ..AuthRedirects::default()
    };
    let guard = RouteGuard::new(session_manager(&provider), redirects);

    let decision = guard.check(&NavigationTarget::protected("/history")).await;
    assert!(matches!(decision, GuardDecision::Redirect(ref r) if r.to == "/login"));
    assert_eq!(guard.redirects().sign_in_url, "/login");
}

#[cfg(debug_assertions)]
#[tokio::test(start_paused = true)]
async fn test_bypass_allows_without_session() {
    let provider = Arc::new(FakeProvider::signed_out());
    let guard = guard_for(&provider).with_bypass(AuthBypass::requested(true));

    let decision = guard.check(&NavigationTarget::protected("/workspace")).await;
    assert_eq!(decision, GuardDecision::Proceed);
    assert_eq!(provider.load_calls(), 0);
}
