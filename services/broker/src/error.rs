use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Broker service error variants.
#[derive(Debug, thiserror::Error)]
pub enum BrokerServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("credential not found")]
    CredentialNotFound,
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
    #[error("re-authentication required")]
    ReauthRequired,
    #[error("remote auth API rejected the request: {0}")]
    RemoteRejected(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl BrokerServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::CredentialNotFound => "CREDENTIAL_NOT_FOUND",
            Self::InvalidCredential(_) => "INVALID_CREDENTIAL",
            Self::ReauthRequired => "REAUTH_REQUIRED",
            Self::RemoteRejected(_) => "REMOTE_REJECTED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for BrokerServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound | Self::CredentialNotFound => StatusCode::NOT_FOUND,
            Self::InvalidCredential(_) => StatusCode::BAD_REQUEST,
            Self::ReauthRequired => StatusCode::UNAUTHORIZED,
            Self::RemoteRejected(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
