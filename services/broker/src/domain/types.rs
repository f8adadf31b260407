use chrono::{DateTime, Duration, Utc};

/// The tenant user. Never mutated by this service.
#[derive(Debug, Clone)]
pub struct TenantUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored Fyers app credential set.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: i64,
    pub user_id: i64,
    pub app_id: String,
    pub app_secret: String,
    pub redirect_url: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied credential fields, validated before they reach a repository.
#[derive(Debug, Clone)]
pub struct CredentialDraft {
    pub app_id: String,
    pub app_secret: String,
    pub redirect_url: String,
}

/// A stored access/refresh token pair.
#[derive(Debug, Clone)]
pub struct FyersToken {
    pub id: i64,
    pub user_id: i64,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FyersToken {
    /// True once the token is inside the refresh buffer (or past expiry).
    pub fn is_expired_or_near(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(REFRESH_BUFFER_SECS) <= now
    }
}

/// A token row about to be persisted. `expires_at` and `created_at` are both
/// derived from the same instant by the caller so the 24-hour window is exact.
#[derive(Debug, Clone)]
pub struct NewFyersToken {
    pub user_id: i64,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// An access/refresh token pair as returned by the remote auth API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Safety margin before actual expiry at which a token is treated as expired,
/// covering clock skew and in-flight request latency.
pub const REFRESH_BUFFER_SECS: i64 = 5 * 60;

/// Lifetime assumed for a freshly minted token. The Fyers API does not return
/// an explicit expiry; access tokens are valid until end of day, 24 hours is
/// the working assumption inherited from the upstream contract.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Background sweep interval.
pub const SWEEP_INTERVAL_SECS: u64 = 15 * 60;

/// Local session JWT lifetime.
pub const SESSION_TTL_SECS: u64 = 60 * 60;

/// Fixed mask substituted for `app_secret` and `access_token` in every
/// outward-facing read.
pub const SECRET_MASK: &str = "••••••••";
