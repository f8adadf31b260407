use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::repository::{FyersAuthPort, UserRepository};
use crate::error::BrokerServiceError;
use crate::state::AppState;
use crate::usecase::lifecycle::{DisconnectUseCase, ExchangeCodeInput, ExchangeCodeUseCase};
use crate::usecase::profile::GetProfileUseCase;
use crate::usecase::session::issue_session_token;

// ── GET /api/auth/status ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AuthStatusResponse {
    pub user_id: i64,
    pub has_active_credentials: bool,
    pub has_valid_token: bool,
    pub token_expires_at: Option<DateTime<Utc>>,
}

pub async fn auth_status(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BrokerServiceError> {
    let usecase = GetProfileUseCase {
        users: state.user_repo(),
        credentials: state.credential_repo(),
        tokens: state.token_repo(),
        fyers: state.fyers.clone(),
    };
    let profile = usecase.execute(state.tenant_user_id).await?;
    Ok(Json(AuthStatusResponse {
        user_id: profile.id,
        has_active_credentials: profile.has_active_credentials,
        has_valid_token: profile.has_valid_token,
        token_expires_at: profile.token_expires_at,
    }))
}

// ── POST /api/auth/url ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AuthUrlRequest {
    pub app_id: String,
    pub redirect_uri: String,
}

#[derive(Serialize)]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

pub async fn create_auth_url(
    State(state): State<AppState>,
    Json(body): Json<AuthUrlRequest>,
) -> Result<impl IntoResponse, BrokerServiceError> {
    if body.app_id.trim().is_empty() || body.redirect_uri.trim().is_empty() {
        return Err(BrokerServiceError::InvalidCredential(
            "app_id and redirect_uri are required".to_owned(),
        ));
    }
    let auth_url = state.fyers.build_auth_url(&body.app_id, &body.redirect_uri);
    Ok(Json(AuthUrlResponse { auth_url }))
}

// ── POST /api/auth/token ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ExchangeTokenRequest {
    pub app_id: String,
    pub app_secret: String,
    pub auth_code: String,
}

#[derive(Serialize)]
pub struct ExchangeTokenResponse {
    pub expires_at: DateTime<Utc>,
    pub session_token: String,
}

pub async fn exchange_token(
    State(state): State<AppState>,
    Json(body): Json<ExchangeTokenRequest>,
) -> Result<impl IntoResponse, BrokerServiceError> {
    let usecase = ExchangeCodeUseCase {
        tokens: state.token_repo(),
        fyers: state.fyers.clone(),
        user_id: state.tenant_user_id,
    };
    let token = usecase
        .execute(ExchangeCodeInput {
            app_id: body.app_id,
            app_secret: body.app_secret,
            auth_code: body.auth_code,
        })
        .await?;

    let user = state
        .user_repo()
        .find_by_id(state.tenant_user_id)
        .await?
        .ok_or(BrokerServiceError::UserNotFound)?;
    let session_token = issue_session_token(&user, &state.jwt_secret)?;

    // The raw access token is never echoed back; the stored expiry and a
    // local session JWT are all the client needs.
    Ok((
        StatusCode::CREATED,
        Json(ExchangeTokenResponse {
            expires_at: token.expires_at,
            session_token,
        }),
    ))
}

// ── POST /api/auth/refresh ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RefreshResponse {
    pub session_token: String,
}

pub async fn refresh_token(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BrokerServiceError> {
    let refreshed = state.refresh_if_needed().execute().await?;
    if !refreshed {
        return Err(BrokerServiceError::ReauthRequired);
    }

    let user = state
        .user_repo()
        .find_by_id(state.tenant_user_id)
        .await?
        .ok_or(BrokerServiceError::UserNotFound)?;
    let session_token = issue_session_token(&user, &state.jwt_secret)?;
    Ok(Json(RefreshResponse { session_token }))
}

// ── POST /api/auth/disconnect ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DisconnectResponse {
    pub disconnected: bool,
}

pub async fn disconnect(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BrokerServiceError> {
    let usecase = DisconnectUseCase {
        tokens: state.token_repo(),
    };
    let disconnected = usecase.execute(state.tenant_user_id).await?;
    Ok(Json(DisconnectResponse { disconnected }))
}
