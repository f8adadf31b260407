/// Broker configuration loaded from environment variables.
#[derive(Debug)]
pub struct BrokerConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing local session JWTs.
    pub jwt_secret: String,
    /// Base URL of the Fyers auth API (default `https://api.fyers.in/api/v3`).
    pub fyers_base_url: String,
    /// TCP port to listen on (default 3115). Env var: `BROKER_PORT`.
    pub broker_port: u16,
    /// Fixed id of the tenant user. Single-user deployment: every request is
    /// scoped to this id, never to "the first row". Env var: `TENANT_USER_ID`.
    pub tenant_user_id: i64,
}

impl BrokerConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            fyers_base_url: std::env::var("FYERS_BASE_URL")
                .unwrap_or_else(|_| "https://api.fyers.in/api/v3".to_owned()),
            broker_port: std::env::var("BROKER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3115),
            tenant_user_id: std::env::var("TENANT_USER_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
        }
    }
}
