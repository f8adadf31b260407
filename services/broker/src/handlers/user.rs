use axum::{Json, extract::State, response::IntoResponse};

use crate::error::BrokerServiceError;
use crate::state::AppState;
use crate::usecase::profile::GetProfileUseCase;

// ── GET /api/user/profile ────────────────────────────────────────────────────

pub async fn get_profile(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BrokerServiceError> {
    let usecase = GetProfileUseCase {
        users: state.user_repo(),
        credentials: state.credential_repo(),
        tokens: state.token_repo(),
        fyers: state.fyers.clone(),
    };
    let profile = usecase.execute(state.tenant_user_id).await?;
    Ok(Json(profile))
}
