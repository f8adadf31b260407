use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::Utc;
use tracing::{error, warn};

use crate::domain::repository::{CredentialRepository, FyersAuthPort, TokenRepository};
use crate::error::BrokerServiceError;
use crate::state::AppState;
use crate::usecase::lifecycle::RefreshIfNeededUseCase;

/// Where a request is sent when it cannot proceed without re-authentication.
pub const REAUTH_TARGET: &str = "/api/auth/status";

/// Outcome of the token gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectTo(String),
    Deny(String),
}

/// Pre-request token gate: refresh the token if it is inside the buffer, then
/// confirm the remote API still accepts it. Wrapped around request groups
/// that call the remote API with the stored token.
pub struct TokenGate<C, T, F>
where
    C: CredentialRepository,
    T: TokenRepository,
    F: FyersAuthPort,
{
    pub refresh: RefreshIfNeededUseCase<C, T, F>,
    pub tokens: T,
    pub fyers: F,
}

impl<C, T, F> TokenGate<C, T, F>
where
    C: CredentialRepository,
    T: TokenRepository,
    F: FyersAuthPort,
{
    pub async fn check(&self, user_id: i64) -> GateDecision {
        let refreshed = match self.refresh.execute().await {
            Ok(refreshed) => refreshed,
            Err(e) => return GateDecision::Deny(e.to_string()),
        };
        if !refreshed {
            return GateDecision::RedirectTo(REAUTH_TARGET.to_owned());
        }

        let latest = match self.tokens.find_latest(user_id).await {
            Ok(latest) => latest,
            Err(e) => return GateDecision::Deny(e.to_string()),
        };
        match latest {
            Some(token) if token.expires_at > Utc::now() => {
                if self.fyers.validate(&token.access_token).await {
                    GateDecision::Allow
                } else {
                    GateDecision::RedirectTo(REAUTH_TARGET.to_owned())
                }
            }
            _ => GateDecision::RedirectTo(REAUTH_TARGET.to_owned()),
        }
    }
}

/// axum middleware wrapping `TokenGate` around a router group.
pub async fn require_fyers_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let gate = state.token_gate();
    match gate.check(state.tenant_user_id).await {
        GateDecision::Allow => next.run(request).await,
        GateDecision::RedirectTo(target) => {
            warn!(redirect = %target, "request gated; valid token unavailable");
            Redirect::temporary(&target).into_response()
        }
        GateDecision::Deny(reason) => {
            error!(%reason, "token gate failed");
            BrokerServiceError::Internal(anyhow::anyhow!(reason)).into_response()
        }
    }
}
