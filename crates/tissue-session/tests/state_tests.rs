//! Session state transition tests

use proptest::prelude::*;
use tissue_session::{Session, SessionState, SessionStatus, User};

fn any_status() -> impl Strategy<Value = SessionStatus> {
    prop_oneof![
        Just(SessionStatus::Uninitialized),
        Just(SessionStatus::Initializing),
        Just(SessionStatus::Ready),
        Just(SessionStatus::Failed),
    ]
}

#[test]
fn test_bootstrap_transitions() {
    assert!(SessionStatus::Uninitialized.can_transition_to(SessionStatus::Initializing));
    assert!(SessionStatus::Initializing.can_transition_to(SessionStatus::Ready));
    assert!(SessionStatus::Initializing.can_transition_to(SessionStatus::Failed));

    // Invalid
    assert!(!SessionStatus::Uninitialized.can_transition_to(SessionStatus::Ready));
    assert!(!SessionStatus::Failed.can_transition_to(SessionStatus::Ready));
}

#[test]
fn test_reset_transitions() {
    assert!(SessionStatus::Ready.can_transition_to(SessionStatus::Uninitialized));
    assert!(SessionStatus::Failed.can_transition_to(SessionStatus::Uninitialized));
    assert!(!SessionStatus::Initializing.can_transition_to(SessionStatus::Uninitialized));
}

#[test]
fn test_signed_in_follows_session() {
    let mut state = SessionState {
        status: SessionStatus::Ready,
        user: Some(User::new("user_1")),
        session: None,
    };
    assert!(!state.is_signed_in());

    state.session = Some(Session::new("sess_1").for_user("user_1"));
    assert!(state.is_signed_in());
}

#[test]
fn test_provider_user_payload_tolerates_missing_fields() {
    let user: User = serde_json::from_value(serde_json::json!({"id": "user_1"})).unwrap();
    assert_eq!(user, User::new("user_1"));

    let session: Session =
        serde_json::from_value(serde_json::json!({"id": "sess_1", "user_id": "user_1"})).unwrap();
    assert_eq!(session.user_id.as_deref(), Some("user_1"));
}

proptest! {
    #[test]
    fn prop_no_status_transitions_to_itself(status in any_status()) {
        prop_assert!(!status.can_transition_to(status));
    }

    #[test]
    fn prop_ready_only_reachable_from_initializing(from in any_status()) {
        let reaches_ready = from.can_transition_to(SessionStatus::Ready);
        prop_assert_eq!(reaches_ready, from == SessionStatus::Initializing);
    }

    #[test]
    fn prop_every_path_from_ready_returns_through_uninitialized(
        steps in prop::collection::vec(any_status(), 1..16)
    ) {
        let mut current = SessionStatus::Ready;
        for next in steps {
            if current.can_transition_to(next) {
                if matches!(current, SessionStatus::Ready | SessionStatus::Failed) {
                    prop_assert_eq!(next, SessionStatus::Uninitialized);
                }
                current = next;
            }
        }
    }
}
