use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::warn;

use crate::domain::repository::{CredentialRepository, FyersAuthPort, TokenRepository};
use crate::domain::types::{FyersToken, NewFyersToken, TOKEN_TTL_SECS};
use crate::error::BrokerServiceError;

/// True when there is no token at all, or the stored one is inside the
/// refresh buffer.
pub fn is_expired_or_near(token: Option<&FyersToken>, now: DateTime<Utc>) -> bool {
    match token {
        None => true,
        Some(t) => t.is_expired_or_near(now),
    }
}

/// Serializes refreshes per user id. The request-path guard and the
/// background sweep both call `RefreshIfNeededUseCase` without coordination;
/// whichever loses the race re-checks freshness after acquiring the lock and
/// becomes a no-op, so the remote refresh runs at most once.
#[derive(Clone, Default)]
pub struct RefreshGate {
    locks: Arc<StdMutex<HashMap<i64, Arc<AsyncMutex<()>>>>>,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().expect("refresh gate poisoned");
            Arc::clone(locks.entry(user_id).or_default())
        };
        lock.lock_owned().await
    }
}

// ── RefreshIfNeeded ──────────────────────────────────────────────────────────

/// Decides and executes whether the current token must be refreshed before it
/// is used.
///
/// `Ok(true)` means the token is usable (fresh, or refreshed just now);
/// `Ok(false)` means it could not be made usable and the caller should treat
/// the session as unauthenticated. Only storage failures surface as `Err`.
pub struct RefreshIfNeededUseCase<C, T, F>
where
    C: CredentialRepository,
    T: TokenRepository,
    F: FyersAuthPort,
{
    pub credentials: C,
    pub tokens: T,
    pub fyers: F,
    pub gate: RefreshGate,
    pub user_id: i64,
}

impl<C, T, F> RefreshIfNeededUseCase<C, T, F>
where
    C: CredentialRepository,
    T: TokenRepository,
    F: FyersAuthPort,
{
    pub async fn execute(&self) -> Result<bool, BrokerServiceError> {
        // Fast path: a fresh token needs no lock, no remote call, no write.
        let latest = self.tokens.find_latest(self.user_id).await?;
        if !is_expired_or_near(latest.as_ref(), Utc::now()) {
            return Ok(true);
        }

        let _guard = self.gate.lock(self.user_id).await;

        // Re-read under the lock: a concurrent trigger may have refreshed
        // while this one waited.
        let Some(token) = self.tokens.find_latest(self.user_id).await? else {
            warn!(user_id = self.user_id, "no stored token to refresh");
            return Ok(false);
        };
        if !token.is_expired_or_near(Utc::now()) {
            return Ok(true);
        }
        let Some(refresh_token) = token.refresh_token.clone() else {
            warn!(user_id = self.user_id, "stored token has no refresh token");
            return Ok(false);
        };
        let Some(credential) = self.credentials.find_active(token.user_id).await? else {
            warn!(user_id = self.user_id, "no active credential for refresh");
            return Ok(false);
        };

        let pair = match self
            .fyers
            .refresh(&credential.app_id, &credential.app_secret, &refresh_token)
            .await
        {
            Ok(pair) => pair,
            Err(e) => {
                // The old token stays untouched; it may still be accepted
                // remotely, and destroying it would force a full re-auth.
                warn!(user_id = self.user_id, error = %e, "token refresh rejected");
                return Ok(false);
            }
        };

        // Persist the replacement first, delete the superseded row second.
        let now = Utc::now();
        self.tokens
            .insert(&NewFyersToken {
                user_id: token.user_id,
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
                expires_at: now + Duration::seconds(TOKEN_TTL_SECS),
                created_at: now,
            })
            .await?;
        self.tokens.delete(token.id).await?;
        Ok(true)
    }
}

// ── ExchangeCode ─────────────────────────────────────────────────────────────

pub struct ExchangeCodeInput {
    pub app_id: String,
    pub app_secret: String,
    pub auth_code: String,
}

pub struct ExchangeCodeUseCase<T, F>
where
    T: TokenRepository,
    F: FyersAuthPort,
{
    pub tokens: T,
    pub fyers: F,
    pub user_id: i64,
}

impl<T, F> ExchangeCodeUseCase<T, F>
where
    T: TokenRepository,
    F: FyersAuthPort,
{
    /// Exchange an authorization code for a token pair and persist it with a
    /// `created_at + 24h` expiry (the remote API returns none).
    pub async fn execute(
        &self,
        input: ExchangeCodeInput,
    ) -> Result<FyersToken, BrokerServiceError> {
        let pair = self
            .fyers
            .exchange_code(&input.app_id, &input.app_secret, &input.auth_code)
            .await?;

        let now = Utc::now();
        let token = self
            .tokens
            .insert(&NewFyersToken {
                user_id: self.user_id,
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
                expires_at: now + Duration::seconds(TOKEN_TTL_SECS),
                created_at: now,
            })
            .await?;
        Ok(token)
    }
}

// ── Disconnect ───────────────────────────────────────────────────────────────

pub struct DisconnectUseCase<T: TokenRepository> {
    pub tokens: T,
}

impl<T: TokenRepository> DisconnectUseCase<T> {
    /// Delete every stored token for the user. Returns whether any existed.
    pub async fn execute(&self, user_id: i64) -> Result<bool, BrokerServiceError> {
        let removed = self.tokens.delete_all(user_id).await?;
        Ok(removed > 0)
    }
}
