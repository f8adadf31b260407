use axum::{Json, extract::State, response::IntoResponse};

use crate::domain::repository::{FyersAuthPort, TokenRepository};
use crate::error::BrokerServiceError;
use crate::state::AppState;

// ── GET /api/fyers/profile ───────────────────────────────────────────────────

/// Passthrough read of the remote Fyers profile with the current access
/// token. The route group is wrapped by the token gate, so the token has
/// already been refreshed if it was near expiry.
pub async fn remote_profile(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BrokerServiceError> {
    let token = state
        .token_repo()
        .find_latest(state.tenant_user_id)
        .await?
        .ok_or(BrokerServiceError::ReauthRequired)?;
    let profile = state.fyers.fetch_profile(&token.access_token).await?;
    Ok(Json(profile))
}
