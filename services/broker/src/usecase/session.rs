use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::domain::types::{SESSION_TTL_SECS, TenantUser};
use crate::error::BrokerServiceError;

/// Claims of the local session JWT handed out after a successful code
/// exchange or explicit refresh.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub jti: String,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

/// Symmetric-key signed bearer token for local session auth (HS256).
pub fn issue_session_token(user: &TenantUser, secret: &str) -> Result<String, BrokerServiceError> {
    let claims = SessionClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        name: user.name.clone(),
        jti: Uuid::new_v4().to_string(),
        exp: now_secs() + SESSION_TTL_SECS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| BrokerServiceError::Internal(e.into()))
}
