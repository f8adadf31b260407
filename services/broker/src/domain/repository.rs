#![allow(async_fn_in_trait)]

use crate::domain::types::{Credential, CredentialDraft, FyersToken, NewFyersToken, TenantUser, TokenPair};
use crate::error::BrokerServiceError;

/// Repository for the tenant user.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<TenantUser>, BrokerServiceError>;
}

/// Repository for Fyers app credential sets.
pub trait CredentialRepository: Send + Sync {
    async fn list(&self, user_id: i64) -> Result<Vec<Credential>, BrokerServiceError>;

    async fn find(&self, user_id: i64, id: i64) -> Result<Option<Credential>, BrokerServiceError>;

    async fn find_active(&self, user_id: i64) -> Result<Option<Credential>, BrokerServiceError>;

    /// Deactivate every credential for the user and insert the draft as the
    /// new active set, in one transaction. No committed state has two active
    /// rows, and the transition window is not observable.
    async fn create_active(
        &self,
        user_id: i64,
        draft: &CredentialDraft,
    ) -> Result<Credential, BrokerServiceError>;

    /// Update the draft fields on an existing row. Returns `false` when the
    /// row does not exist for this user.
    async fn update(
        &self,
        user_id: i64,
        id: i64,
        draft: &CredentialDraft,
    ) -> Result<bool, BrokerServiceError>;

    /// Hard delete. Returns `false` when the row does not exist for this user.
    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, BrokerServiceError>;

    /// Deactivate every credential for the user, then activate the target, in
    /// one transaction. Returns `false` (writing nothing) when the target does
    /// not exist for this user.
    async fn activate(&self, user_id: i64, id: i64) -> Result<bool, BrokerServiceError>;
}

/// Repository for stored token pairs. The "current" token is the most
/// recently created row.
pub trait TokenRepository: Send + Sync {
    async fn find_latest(&self, user_id: i64) -> Result<Option<FyersToken>, BrokerServiceError>;

    async fn insert(&self, token: &NewFyersToken) -> Result<FyersToken, BrokerServiceError>;

    /// Delete one row by id. Returns `false` when the row does not exist.
    async fn delete(&self, id: i64) -> Result<bool, BrokerServiceError>;

    /// Delete every row for the user. Returns the number of rows removed.
    async fn delete_all(&self, user_id: i64) -> Result<u64, BrokerServiceError>;
}

/// Port for the remote Fyers auth API. All network operations carry the
/// client's own timeout; any non-success response (HTTP status or payload
/// envelope) surfaces uniformly as `RemoteRejected`.
pub trait FyersAuthPort: Send + Sync {
    /// Deterministic URL construction with a fresh anti-replay `state`.
    /// No network call.
    fn build_auth_url(&self, app_id: &str, redirect_uri: &str) -> String;

    async fn exchange_code(
        &self,
        app_id: &str,
        app_secret: &str,
        auth_code: &str,
    ) -> Result<TokenPair, BrokerServiceError>;

    async fn refresh(
        &self,
        app_id: &str,
        app_secret: &str,
        refresh_token: &str,
    ) -> Result<TokenPair, BrokerServiceError>;

    /// Whether the remote API currently accepts this bearer token
    /// (implemented as a profile fetch). Failures of any kind are `false`.
    async fn validate(&self, access_token: &str) -> bool;

    /// Fetch the remote profile payload for a guarded passthrough read.
    async fn fetch_profile(
        &self,
        access_token: &str,
    ) -> Result<serde_json::Value, BrokerServiceError>;
}
