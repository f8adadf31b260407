use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::repository::{
    CredentialRepository, FyersAuthPort, TokenRepository, UserRepository,
};
use crate::error::BrokerServiceError;

/// Read-only aggregate of credential and token state for the tenant user.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub has_active_credentials: bool,
    pub has_valid_token: bool,
    pub token_expires_at: Option<DateTime<Utc>>,
}

pub struct GetProfileUseCase<U, C, T, F>
where
    U: UserRepository,
    C: CredentialRepository,
    T: TokenRepository,
    F: FyersAuthPort,
{
    pub users: U,
    pub credentials: C,
    pub tokens: T,
    pub fyers: F,
}

impl<U, C, T, F> GetProfileUseCase<U, C, T, F>
where
    U: UserRepository,
    C: CredentialRepository,
    T: TokenRepository,
    F: FyersAuthPort,
{
    pub async fn execute(&self, user_id: i64) -> Result<Profile, BrokerServiceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(BrokerServiceError::UserNotFound)?;

        let has_active_credentials = self.credentials.find_active(user_id).await?.is_some();
        let latest = self.tokens.find_latest(user_id).await?;

        // A valid token must be locally unexpired AND still accepted by the
        // remote API; a locally expired one skips the remote round-trip.
        let has_valid_token = match &latest {
            Some(token) if token.expires_at > Utc::now() => {
                self.fyers.validate(&token.access_token).await
            }
            _ => false,
        };

        Ok(Profile {
            id: user.id,
            name: user.name,
            email: user.email,
            has_active_credentials,
            has_valid_token,
            token_expires_at: latest.map(|t| t.expires_at),
        })
    }
}
