use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::error::BrokerServiceError;
use crate::state::AppState;
use crate::usecase::credentials::{
    ActivateCredentialUseCase, CreateCredentialUseCase, CredentialInput, DeleteCredentialUseCase,
    GetActiveCredentialUseCase, ListCredentialsUseCase, UpdateCredentialUseCase,
};

#[derive(Deserialize)]
pub struct CredentialRequest {
    pub app_id: String,
    pub app_secret: String,
    pub redirect_url: String,
}

impl From<CredentialRequest> for CredentialInput {
    fn from(body: CredentialRequest) -> Self {
        Self {
            app_id: body.app_id,
            app_secret: body.app_secret,
            redirect_url: body.redirect_url,
        }
    }
}

// ── GET /api/credentials ─────────────────────────────────────────────────────

pub async fn list_credentials(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BrokerServiceError> {
    let usecase = ListCredentialsUseCase {
        repo: state.credential_repo(),
    };
    let credentials = usecase.execute(state.tenant_user_id).await?;
    Ok(Json(credentials))
}

// ── GET /api/credentials/active ──────────────────────────────────────────────

pub async fn get_active_credential(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BrokerServiceError> {
    let usecase = GetActiveCredentialUseCase {
        repo: state.credential_repo(),
    };
    let credential = usecase.execute(state.tenant_user_id).await?;
    Ok(Json(credential))
}

// ── POST /api/credentials ────────────────────────────────────────────────────

pub async fn create_credential(
    State(state): State<AppState>,
    Json(body): Json<CredentialRequest>,
) -> Result<impl IntoResponse, BrokerServiceError> {
    let usecase = CreateCredentialUseCase {
        repo: state.credential_repo(),
    };
    let credential = usecase.execute(state.tenant_user_id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(credential)))
}

// ── PUT /api/credentials/{id} ────────────────────────────────────────────────

pub async fn update_credential(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<CredentialRequest>,
) -> Result<StatusCode, BrokerServiceError> {
    let usecase = UpdateCredentialUseCase {
        repo: state.credential_repo(),
    };
    usecase.execute(state.tenant_user_id, id, body.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /api/credentials/{id} ─────────────────────────────────────────────

pub async fn delete_credential(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, BrokerServiceError> {
    let usecase = DeleteCredentialUseCase {
        repo: state.credential_repo(),
    };
    usecase.execute(state.tenant_user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── PUT /api/credentials/{id}/activate ───────────────────────────────────────

pub async fn activate_credential(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, BrokerServiceError> {
    let usecase = ActivateCredentialUseCase {
        repo: state.credential_repo(),
    };
    usecase.execute(state.tenant_user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
