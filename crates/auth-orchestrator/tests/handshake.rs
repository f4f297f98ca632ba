//! End-to-end handshake behaviour against in-memory host and backend.

mod common;

use auth_orchestrator::{AuthError, HandshakeStep, RunOutcome};
use common::{ExchangeReply, Harness, MockBridge, MockIdentityService};
use gig_auth_config::UserRole;
use health_monitor::{ConnectivityProbe, HealthMonitor, HealthProbe, MonitorConfig, StaticConnectivity};
use platform_storage::{KeyValueStore, StorageKeys};
use std::sync::Arc;
use std::time::Duration;

fn session(token: &str) -> MockIdentityService {
    MockIdentityService::always(ExchangeReply::Session(token.to_string()))
}

/// Scenario A: signed-in host user, healthy backend.
#[tokio::test]
async fn signed_in_host_user_gets_an_application_session() {
    let harness = Harness::new(MockBridge::logged_in("tok_abc"), session("sess_1"));
    let orchestrator = harness.orchestrator();

    let outcome = orchestrator.run().await.unwrap();

    let RunOutcome::Completed(user) = outcome else {
        panic!("expected a completed handshake");
    };
    assert_eq!(user.id, "u1");
    assert_eq!(user.display_name, "Somchai");
    assert_eq!(orchestrator.step(), HandshakeStep::Done);

    // The backend saw the host token and profile for the configured role
    let requests = harness.identity.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].identity_assertion, "tok_abc");
    assert_eq!(requests[0].requested_role, UserRole::Seeker);
    assert_eq!(
        requests[0].profile.as_ref().map(|p| p.display_name.as_str()),
        Some("Somchai")
    );

    // The provider got the minted session token
    assert_eq!(harness.provider.tokens(), vec!["sess_1".to_string()]);

    // The user was visible before the post-login route rendered
    assert_eq!(
        harness.navigator.replaces(),
        vec![("/seeker/jobs".to_string(), true)]
    );
    assert_eq!(harness.user.get().map(|u| u.id.clone()).as_deref(), Some("u1"));
}

#[tokio::test]
async fn completed_handshake_leaves_audit_trail_and_session() {
    let harness = Harness::new(MockBridge::logged_in("tok_abc"), session("sess_1"));
    harness.orchestrator().run().await.unwrap();

    assert_eq!(
        harness.storage.get(StorageKeys::AUDIT_ID_TOKEN).unwrap().as_deref(),
        Some("tok_abc")
    );
    let profile = harness.storage.get(StorageKeys::AUDIT_PROFILE).unwrap().unwrap();
    assert!(profile.contains("Somchai"));

    let sessions = harness.sessions();
    for step in ["sdk_loading", "token_retrieval", "backend_exchange", "done"] {
        assert!(
            sessions.step_timestamp(step).unwrap().is_some(),
            "missing timestamp for {}",
            step
        );
    }

    let record = sessions.session().unwrap().unwrap();
    assert_eq!(record.user_id.as_deref(), Some("u1"));
    assert!(!record.session_id.is_empty());
}

#[tokio::test]
async fn signed_out_host_user_is_sent_to_login_without_backend_call() {
    let harness = Harness::new(MockBridge::logged_out(), session("sess_1"));
    let orchestrator = harness.orchestrator();

    let outcome = orchestrator.run().await.unwrap();

    assert_eq!(outcome, RunOutcome::NotLoggedIn);
    assert_eq!(orchestrator.step(), HandshakeStep::NotLoggedIn);
    assert_eq!(harness.bridge.login_calls(), 1);
    assert_eq!(harness.identity.calls(), 0);
    assert!(harness.provider.tokens().is_empty());
    assert_eq!(harness.navigator.replaces(), vec![("/".to_string(), false)]);
}

#[tokio::test]
async fn profile_failure_does_not_stop_the_handshake() {
    let harness = Harness::new(
        MockBridge::logged_in("tok_abc").with_failing_profile(),
        session("sess_1"),
    );
    let orchestrator = harness.orchestrator();

    let outcome = orchestrator.run().await.unwrap();

    assert!(matches!(outcome, RunOutcome::Completed(_)));
    assert_eq!(orchestrator.step(), HandshakeStep::Done);
    assert!(harness.identity.requests()[0].profile.is_none());
    assert!(harness.storage.get(StorageKeys::AUDIT_PROFILE).unwrap().is_none());
}

#[tokio::test]
async fn missing_identity_token_is_fatal() {
    let harness = Harness::new(MockBridge::without_token(), session("sess_1"));
    let orchestrator = harness.orchestrator();

    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, AuthError::TokenUnavailable));
    assert_eq!(orchestrator.step(), HandshakeStep::Error);
    assert_eq!(harness.identity.calls(), 0);
    assert!(!harness.user.is_signed_in());
    assert_eq!(
        harness.navigator.replaces(),
        vec![("/?auth_error=token_unavailable".to_string(), false)]
    );
    assert!(harness
        .storage
        .get(StorageKeys::AUDIT_LAST_ERROR)
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn rejected_token_sends_user_to_landing_with_code() {
    let harness = Harness::new(
        MockBridge::logged_in("tok_expired"),
        MockIdentityService::always(ExchangeReply::Reject {
            status: 401,
            code: Some("invalid_token".to_string()),
            message: "ID token expired".to_string(),
        }),
    );
    let orchestrator = harness.orchestrator();

    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, AuthError::AuthExchange { status: Some(401), .. }));
    assert!(harness.provider.tokens().is_empty());
    assert_eq!(
        harness.navigator.replaces(),
        vec![("/?auth_error=invalid_token".to_string(), false)]
    );
}

#[tokio::test]
async fn backend_error_code_is_encoded_into_the_route() {
    let harness = Harness::new(
        MockBridge::logged_in("tok_abc"),
        MockIdentityService::always(ExchangeReply::Reject {
            status: 403,
            code: Some("role denied&next=/admin".to_string()),
            message: "Role not allowed".to_string(),
        }),
    );
    let orchestrator = harness.orchestrator();

    orchestrator.run().await.unwrap_err();

    assert_eq!(
        harness.navigator.replaces(),
        vec![(
            "/?auth_error=role+denied%26next%3D%2Fadmin".to_string(),
            false
        )]
    );
}

#[tokio::test]
async fn transient_failure_keeps_the_current_route() {
    let harness = Harness::new(
        MockBridge::logged_in("tok_abc"),
        MockIdentityService::always(ExchangeReply::Timeout),
    );
    let orchestrator = harness.orchestrator();

    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, AuthError::Timeout));
    assert_eq!(orchestrator.step(), HandshakeStep::Error);
    assert!(harness.navigator.replaces().is_empty());
}

#[tokio::test]
async fn unhealthy_snapshot_blocks_the_attempt() {
    let harness = Harness::new(MockBridge::logged_in("tok_abc"), session("sess_1"));
    let offline: Arc<dyn HealthProbe> = Arc::new(ConnectivityProbe::new(Arc::new(
        StaticConnectivity::new(false),
    )));
    let monitor = Arc::new(HealthMonitor::new(MonitorConfig::default(), vec![offline]));
    monitor.check_now().await;

    let orchestrator = harness.orchestrator().with_health(monitor);
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, AuthError::HealthGate(ref reason) if reason.contains("connectivity")));
    assert!(err.is_recoverable());
    assert_eq!(harness.sdk.loads(), 0);
    assert_eq!(harness.identity.calls(), 0);
}

#[tokio::test]
async fn healthy_snapshot_lets_the_attempt_through() {
    let harness = Harness::new(MockBridge::logged_in("tok_abc"), session("sess_1"));
    let online: Arc<dyn HealthProbe> = Arc::new(ConnectivityProbe::new(Arc::new(
        StaticConnectivity::new(true),
    )));
    let monitor = Arc::new(HealthMonitor::new(MonitorConfig::default(), vec![online]));
    monitor.check_now().await;

    let orchestrator = harness.orchestrator().with_health(monitor);
    assert!(orchestrator.run().await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn second_run_while_one_is_in_flight_is_refused() {
    let harness = Harness::new(
        MockBridge::logged_in("tok_abc"),
        MockIdentityService::always(ExchangeReply::Slow(
            Duration::from_secs(5),
            "sess_1".to_string(),
        )),
    );
    let orchestrator = Arc::new(harness.orchestrator());
    let mut steps = orchestrator.subscribe();

    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.run().await })
    };
    steps
        .wait_for(|s| *s == HandshakeStep::BackendExchange)
        .await
        .unwrap();

    let err = orchestrator.run().await.unwrap_err();
    assert!(matches!(err, AuthError::RunInProgress));
    // The refused run did not disturb the one in flight
    assert_eq!(orchestrator.step(), HandshakeStep::BackendExchange);

    let outcome = first.await.unwrap().unwrap();
    assert!(matches!(outcome, RunOutcome::Completed(_)));
    assert_eq!(harness.identity.calls(), 1);
}

#[tokio::test]
async fn sdk_is_loaded_once_across_runs() {
    let harness = Harness::new(MockBridge::logged_in("tok_abc"), session("sess_1"));
    let orchestrator = harness.orchestrator();

    orchestrator.run().await.unwrap();
    orchestrator.run().await.unwrap();

    assert_eq!(harness.sdk.loads(), 1);
    assert_eq!(harness.identity.calls(), 2);
}

#[tokio::test]
async fn logout_clears_user_session_and_host() {
    let harness = Harness::new(MockBridge::logged_in("tok_abc"), session("sess_1"));
    let orchestrator = harness.orchestrator();
    orchestrator.run().await.unwrap();

    orchestrator.logout().await.unwrap();

    assert!(!harness.user.is_signed_in());
    assert!(harness.sessions().session().unwrap().is_none());
    assert_eq!(harness.provider.sign_outs(), 1);
    assert_eq!(harness.bridge.logout_calls(), 1);
    assert_eq!(orchestrator.step(), HandshakeStep::Start);
    assert_eq!(
        harness.navigator.replaces().last(),
        Some(&("/".to_string(), false))
    );
}
