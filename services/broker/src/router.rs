use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::guard::require_fyers_token;
use crate::handlers::{
    auth::{auth_status, create_auth_url, disconnect, exchange_token, refresh_token},
    credentials::{
        activate_credential, create_credential, delete_credential, get_active_credential,
        list_credentials, update_credential,
    },
    fyers::remote_profile,
    user::get_profile,
};
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Handler for `GET /healthz` — liveness check.
async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz` — readiness check.
async fn readyz() -> StatusCode {
    StatusCode::OK
}

pub fn build_router(state: AppState) -> Router {
    // Routes that spend the stored token against the remote API sit behind
    // the token gate (per-request refresh trigger + validity check).
    let gated = Router::new()
        .route("/api/fyers/profile", get(remote_profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_fyers_token,
        ));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Credentials
        .route("/api/credentials", get(list_credentials))
        .route("/api/credentials", post(create_credential))
        .route("/api/credentials/active", get(get_active_credential))
        .route("/api/credentials/{id}", put(update_credential))
        .route("/api/credentials/{id}", delete(delete_credential))
        .route("/api/credentials/{id}/activate", put(activate_credential))
        // Auth flow
        .route("/api/auth/status", get(auth_status))
        .route("/api/auth/url", post(create_auth_url))
        .route("/api/auth/token", post(exchange_token))
        .route("/api/auth/refresh", post(refresh_token))
        .route("/api/auth/disconnect", post(disconnect))
        // User
        .route("/api/user/profile", get(get_profile))
        // Remote passthrough (token-gated)
        .merge(gated)
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
