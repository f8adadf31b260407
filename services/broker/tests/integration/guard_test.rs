use swingdesk_broker::guard::{GateDecision, REAUTH_TARGET, TokenGate};
use swingdesk_broker::usecase::lifecycle::{RefreshGate, RefreshIfNeededUseCase};

use crate::helpers::{
    MockCredentialRepo, MockFyersPort, MockTokenRepo, TENANT, active_credential, token_expiring_in,
};

fn gate(
    credentials: MockCredentialRepo,
    tokens: MockTokenRepo,
    fyers: MockFyersPort,
) -> TokenGate<MockCredentialRepo, MockTokenRepo, MockFyersPort> {
    TokenGate {
        refresh: RefreshIfNeededUseCase {
            credentials,
            tokens: tokens.clone(),
            fyers: fyers.clone(),
            gate: RefreshGate::new(),
            user_id: TENANT,
        },
        tokens,
        fyers,
    }
}

#[tokio::test]
async fn should_allow_with_fresh_remotely_accepted_token() {
    let gate = gate(
        MockCredentialRepo::with(vec![active_credential(1, "A1")]),
        MockTokenRepo::with(vec![token_expiring_in(1, 60 * 60, Some("R1"))]),
        MockFyersPort::rejecting().accepting(),
    );

    assert_eq!(gate.check(TENANT).await, GateDecision::Allow);
}

#[tokio::test]
async fn should_refresh_near_expiry_token_before_allowing() {
    let tokens = MockTokenRepo::with(vec![token_expiring_in(1, 60, Some("R1"))]);
    let fyers = MockFyersPort::rejecting()
        .refresh_ok("T2", Some("R2"))
        .accepting();
    let gate = gate(
        MockCredentialRepo::with(vec![active_credential(1, "A1")]),
        tokens.clone(),
        fyers.clone(),
    );

    assert_eq!(gate.check(TENANT).await, GateDecision::Allow);
    assert_eq!(fyers.refresh_count(), 1);
    let rows = tokens.rows_handle();
    assert_eq!(rows.lock().unwrap()[0].access_token, "T2");
}

#[tokio::test]
async fn should_redirect_when_no_token_can_be_refreshed() {
    let gate = gate(
        MockCredentialRepo::new(),
        MockTokenRepo::new(),
        MockFyersPort::rejecting(),
    );

    assert_eq!(
        gate.check(TENANT).await,
        GateDecision::RedirectTo(REAUTH_TARGET.to_owned())
    );
}

#[tokio::test]
async fn should_redirect_when_remote_api_rejects_a_fresh_token() {
    let gate = gate(
        MockCredentialRepo::with(vec![active_credential(1, "A1")]),
        MockTokenRepo::with(vec![token_expiring_in(1, 60 * 60, Some("R1"))]),
        MockFyersPort::rejecting(), // token locally fresh, remotely refused
    );

    assert_eq!(
        gate.check(TENANT).await,
        GateDecision::RedirectTo(REAUTH_TARGET.to_owned())
    );
}

#[tokio::test]
async fn should_deny_on_storage_failure() {
    let gate = gate(
        MockCredentialRepo::new(),
        MockTokenRepo::failing(),
        MockFyersPort::rejecting(),
    );

    match gate.check(TENANT).await {
        GateDecision::Deny(reason) => assert!(!reason.is_empty()),
        other => panic!("expected Deny, got {other:?}"),
    }
}
