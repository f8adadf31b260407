use chrono::Duration;

use swingdesk_broker::domain::types::TOKEN_TTL_SECS;
use swingdesk_broker::error::BrokerServiceError;
use swingdesk_broker::usecase::lifecycle::{
    DisconnectUseCase, ExchangeCodeInput, ExchangeCodeUseCase, RefreshGate, RefreshIfNeededUseCase,
};

use crate::helpers::{
    MockCredentialRepo, MockFyersPort, MockTokenRepo, TENANT, active_credential, token_expiring_in,
};

fn refresh_usecase(
    credentials: MockCredentialRepo,
    tokens: MockTokenRepo,
    fyers: MockFyersPort,
) -> RefreshIfNeededUseCase<MockCredentialRepo, MockTokenRepo, MockFyersPort> {
    RefreshIfNeededUseCase {
        credentials,
        tokens,
        fyers,
        gate: RefreshGate::new(),
        user_id: TENANT,
    }
}

// ── RefreshIfNeededUseCase ───────────────────────────────────────────────────

#[tokio::test]
async fn should_no_op_when_token_is_fresh() {
    let tokens = MockTokenRepo::with(vec![token_expiring_in(1, 6 * 60, Some("R1"))]);
    let fyers = MockFyersPort::rejecting();
    let usecase = refresh_usecase(
        MockCredentialRepo::with(vec![active_credential(1, "A1")]),
        tokens.clone(),
        fyers.clone(),
    );

    assert!(usecase.execute().await.unwrap());
    assert_eq!(fyers.refresh_count(), 0);
    assert_eq!(tokens.insert_count(), 0);
    assert_eq!(tokens.delete_count(), 0);
}

#[tokio::test]
async fn should_stay_idempotent_across_consecutive_calls() {
    let tokens = MockTokenRepo::with(vec![token_expiring_in(1, 60 * 60, Some("R1"))]);
    let fyers = MockFyersPort::rejecting();
    let usecase = refresh_usecase(
        MockCredentialRepo::with(vec![active_credential(1, "A1")]),
        tokens.clone(),
        fyers.clone(),
    );

    assert!(usecase.execute().await.unwrap());
    assert!(usecase.execute().await.unwrap());

    assert_eq!(fyers.refresh_count(), 0);
    assert_eq!(tokens.insert_count(), 0);
    assert_eq!(tokens.delete_count(), 0);
    assert_eq!(tokens.latest_id(), Some(1));
}

#[tokio::test]
async fn should_refresh_token_four_minutes_from_expiry() {
    let tokens = MockTokenRepo::with(vec![token_expiring_in(1, 4 * 60, Some("R1"))]);
    let fyers = MockFyersPort::rejecting().refresh_ok("T2", Some("R2"));
    let usecase = refresh_usecase(
        MockCredentialRepo::with(vec![active_credential(1, "A1")]),
        tokens.clone(),
        fyers.clone(),
    );

    assert!(usecase.execute().await.unwrap());
    assert_eq!(fyers.refresh_count(), 1);
}

#[tokio::test]
async fn should_not_refresh_token_six_minutes_from_expiry() {
    let tokens = MockTokenRepo::with(vec![token_expiring_in(1, 6 * 60, Some("R1"))]);
    let fyers = MockFyersPort::rejecting().refresh_ok("T2", Some("R2"));
    let usecase = refresh_usecase(
        MockCredentialRepo::with(vec![active_credential(1, "A1")]),
        tokens.clone(),
        fyers.clone(),
    );

    assert!(usecase.execute().await.unwrap());
    assert_eq!(fyers.refresh_count(), 0);
}

#[tokio::test]
async fn should_fail_without_any_stored_token() {
    let usecase = refresh_usecase(
        MockCredentialRepo::with(vec![active_credential(1, "A1")]),
        MockTokenRepo::new(),
        MockFyersPort::rejecting(),
    );

    assert!(!usecase.execute().await.unwrap());
}

#[tokio::test]
async fn should_fail_when_stored_token_has_no_refresh_token() {
    let tokens = MockTokenRepo::with(vec![token_expiring_in(1, -60, None)]);
    let fyers = MockFyersPort::rejecting().refresh_ok("T2", Some("R2"));
    let usecase = refresh_usecase(
        MockCredentialRepo::with(vec![active_credential(1, "A1")]),
        tokens.clone(),
        fyers.clone(),
    );

    assert!(!usecase.execute().await.unwrap());
    assert_eq!(fyers.refresh_count(), 0);
    assert_eq!(tokens.latest_id(), Some(1));
}

#[tokio::test]
async fn should_fail_without_an_active_credential() {
    let tokens = MockTokenRepo::with(vec![token_expiring_in(1, -60, Some("R1"))]);
    let fyers = MockFyersPort::rejecting().refresh_ok("T2", Some("R2"));
    let usecase = refresh_usecase(MockCredentialRepo::new(), tokens.clone(), fyers.clone());

    assert!(!usecase.execute().await.unwrap());
    assert_eq!(fyers.refresh_count(), 0);
}

#[tokio::test]
async fn should_leave_store_untouched_when_remote_refresh_fails() {
    let tokens = MockTokenRepo::with(vec![token_expiring_in(1, -60, Some("R1"))]);
    let fyers = MockFyersPort::rejecting();
    let usecase = refresh_usecase(
        MockCredentialRepo::with(vec![active_credential(1, "A1")]),
        tokens.clone(),
        fyers.clone(),
    );

    assert!(!usecase.execute().await.unwrap());

    // The rejected attempt must not create or destroy anything: same latest
    // row id as before the call.
    assert_eq!(fyers.refresh_count(), 1);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens.latest_id(), Some(1));
    assert_eq!(tokens.insert_count(), 0);
    assert_eq!(tokens.delete_count(), 0);
}

#[tokio::test]
async fn should_replace_expired_token_via_active_credential() {
    let tokens = MockTokenRepo::with(vec![token_expiring_in(1, -60, Some("R1"))]);
    let fyers = MockFyersPort::rejecting().refresh_ok("T2", Some("R2"));
    let usecase = refresh_usecase(
        MockCredentialRepo::with(vec![active_credential(1, "A1")]),
        tokens.clone(),
        fyers.clone(),
    );

    assert!(usecase.execute().await.unwrap());

    // Exactly one row remains and it is the replacement.
    let rows = tokens.rows_handle();
    let rows = rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].access_token, "T2");
    assert_eq!(rows[0].refresh_token.as_deref(), Some("R2"));
    assert_ne!(rows[0].id, 1);

    // The refresh call carried the active credential and the stored
    // refresh token.
    let (app_id, app_secret, refresh_token) = fyers.last_refresh_args().unwrap();
    assert_eq!(app_id, "A1");
    assert_eq!(app_secret, "super-secret");
    assert_eq!(refresh_token, "R1");
}

#[tokio::test]
async fn should_set_replacement_expiry_one_day_after_creation() {
    let tokens = MockTokenRepo::with(vec![token_expiring_in(1, -60, Some("R1"))]);
    let usecase = refresh_usecase(
        MockCredentialRepo::with(vec![active_credential(1, "A1")]),
        tokens.clone(),
        MockFyersPort::rejecting().refresh_ok("T2", Some("R2")),
    );

    assert!(usecase.execute().await.unwrap());

    let rows = tokens.rows_handle();
    let rows = rows.lock().unwrap();
    assert_eq!(
        rows[0].expires_at,
        rows[0].created_at + Duration::seconds(TOKEN_TTL_SECS)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn should_run_remote_refresh_once_for_concurrent_triggers() {
    let tokens = MockTokenRepo::with(vec![token_expiring_in(1, -60, Some("R1"))]);
    let credentials = MockCredentialRepo::with(vec![active_credential(1, "A1")]);
    let fyers = MockFyersPort::rejecting()
        .refresh_ok("T2", Some("R2"))
        .slow_refresh(50);
    let gate = RefreshGate::new();

    // Request-path trigger and background sweep share store and gate.
    let request_trigger = RefreshIfNeededUseCase {
        credentials: credentials.clone(),
        tokens: tokens.clone(),
        fyers: fyers.clone(),
        gate: gate.clone(),
        user_id: TENANT,
    };
    let sweep_trigger = RefreshIfNeededUseCase {
        credentials,
        tokens: tokens.clone(),
        fyers: fyers.clone(),
        gate,
        user_id: TENANT,
    };

    let (first, second) = tokio::join!(request_trigger.execute(), sweep_trigger.execute());
    assert!(first.unwrap());
    assert!(second.unwrap());

    // The loser of the race re-checked under the lock and became a no-op.
    assert_eq!(fyers.refresh_count(), 1);
    assert_eq!(tokens.len(), 1);
    let rows = tokens.rows_handle();
    assert_eq!(rows.lock().unwrap()[0].access_token, "T2");
}

#[tokio::test]
async fn should_propagate_storage_errors() {
    let usecase = refresh_usecase(
        MockCredentialRepo::new(),
        MockTokenRepo::failing(),
        MockFyersPort::rejecting(),
    );

    let result = usecase.execute().await;
    assert!(matches!(result, Err(BrokerServiceError::Internal(_))));
}

// ── ExchangeCodeUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_persist_exchanged_token_verbatim() {
    let tokens = MockTokenRepo::new();
    let fyers = MockFyersPort::rejecting().exchange_ok("T1", Some("R1"));
    let usecase = ExchangeCodeUseCase {
        tokens: tokens.clone(),
        fyers: fyers.clone(),
        user_id: TENANT,
    };

    let token = usecase
        .execute(ExchangeCodeInput {
            app_id: "A1".to_owned(),
            app_secret: "super-secret".to_owned(),
            auth_code: "CODE".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(token.access_token, "T1");
    assert_eq!(token.refresh_token.as_deref(), Some("R1"));
    assert_eq!(token.expires_at, token.created_at + Duration::seconds(TOKEN_TTL_SECS));
    assert_eq!(tokens.len(), 1);
    assert_eq!(fyers.exchange_count(), 1);
}

#[tokio::test]
async fn should_not_persist_anything_when_exchange_is_rejected() {
    let tokens = MockTokenRepo::new();
    let usecase = ExchangeCodeUseCase {
        tokens: tokens.clone(),
        fyers: MockFyersPort::rejecting(),
        user_id: TENANT,
    };

    let result = usecase
        .execute(ExchangeCodeInput {
            app_id: "A1".to_owned(),
            app_secret: "super-secret".to_owned(),
            auth_code: "BAD".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(BrokerServiceError::RemoteRejected(_))));
    assert_eq!(tokens.len(), 0);
}

// ── DisconnectUseCase ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_delete_every_token_on_disconnect() {
    let tokens = MockTokenRepo::with(vec![
        token_expiring_in(1, -60, Some("R1")),
        token_expiring_in(2, 60 * 60, Some("R2")),
    ]);
    let usecase = DisconnectUseCase {
        tokens: tokens.clone(),
    };

    assert!(usecase.execute(TENANT).await.unwrap());
    assert_eq!(tokens.len(), 0);

    // A second disconnect has nothing left to remove.
    assert!(!usecase.execute(TENANT).await.unwrap());
}
