use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::domain::repository::FyersAuthPort;
use crate::domain::types::TokenPair;
use crate::error::BrokerServiceError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for the Fyers auth API. Responses are JSON envelopes
/// `{s, code, message, data}`; only `s == "ok"` with non-null `data` counts
/// as success, every other shape (including transport and HTTP-status
/// failures) maps to `RemoteRejected`.
#[derive(Clone)]
pub struct FyersAuthClient {
    http: reqwest::Client,
    base: Url,
}

impl FyersAuthClient {
    pub fn new(base_url: &str) -> Self {
        let base = Url::parse(base_url).expect("invalid FYERS_BASE_URL");
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build Fyers HTTP client");
        Self { http, base }
    }

    fn endpoint(&self, segment: &str) -> Url {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .expect("FYERS_BASE_URL cannot be a base")
            .push(segment);
        url
    }

    async fn post_token_request(
        &self,
        segment: &str,
        body: &Value,
    ) -> Result<TokenPair, BrokerServiceError> {
        let response = self
            .http
            .post(self.endpoint(segment))
            .json(body)
            .send()
            .await
            .map_err(|e| BrokerServiceError::RemoteRejected(format!("request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BrokerServiceError::RemoteRejected(format!("unreadable body: {e}")))?;
        if !status.is_success() {
            return Err(BrokerServiceError::RemoteRejected(format!(
                "HTTP {status}: {text}"
            )));
        }

        let data = unwrap_envelope(&text)?;
        token_pair_from_data(data)
    }
}

impl FyersAuthPort for FyersAuthClient {
    fn build_auth_url(&self, app_id: &str, redirect_uri: &str) -> String {
        let mut url = self.endpoint("generate-authcode");
        url.query_pairs_mut()
            .append_pair("client_id", app_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("state", &Uuid::new_v4().to_string());
        url.to_string()
    }

    async fn exchange_code(
        &self,
        app_id: &str,
        app_secret: &str,
        auth_code: &str,
    ) -> Result<TokenPair, BrokerServiceError> {
        let body = json!({
            "grant_type": "authorization_code",
            "appIdHash": app_id_hash(app_id, app_secret),
            "code": auth_code,
        });
        let pair = self.post_token_request("validate-authcode", &body).await?;
        info!(app_id, "authorization code exchanged");
        Ok(pair)
    }

    async fn refresh(
        &self,
        app_id: &str,
        app_secret: &str,
        refresh_token: &str,
    ) -> Result<TokenPair, BrokerServiceError> {
        let body = json!({
            "grant_type": "refresh_token",
            "appIdHash": app_id_hash(app_id, app_secret),
            "refresh_token": refresh_token,
        });
        let pair = self
            .post_token_request("validate-refresh-token", &body)
            .await?;
        info!(app_id, "access token refreshed");
        Ok(pair)
    }

    async fn validate(&self, access_token: &str) -> bool {
        self.fetch_profile(access_token).await.is_ok()
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<Value, BrokerServiceError> {
        let response = self
            .http
            .get(self.endpoint("profile"))
            .bearer_auth(access_token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| BrokerServiceError::RemoteRejected(format!("request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BrokerServiceError::RemoteRejected(format!("unreadable body: {e}")))?;
        if !status.is_success() {
            return Err(BrokerServiceError::RemoteRejected(format!(
                "HTTP {status}: {text}"
            )));
        }
        unwrap_envelope(&text)
    }
}

/// Fyers `appIdHash`: lowercase hex SHA-256 of `"{app_id}:{app_secret}"`.
pub fn app_id_hash(app_id: &str, app_secret: &str) -> String {
    let digest = Sha256::digest(format!("{app_id}:{app_secret}").as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Deserialize)]
struct Envelope {
    s: Option<String>,
    #[allow(dead_code)]
    code: Option<i64>,
    message: Option<String>,
    data: Option<Value>,
}

/// Extract `data` from a Fyers envelope, treating anything but
/// `s == "ok"` with non-null data as a remote rejection.
fn unwrap_envelope(body: &str) -> Result<Value, BrokerServiceError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| BrokerServiceError::RemoteRejected(format!("malformed body: {e}")))?;
    match envelope {
        Envelope {
            s: Some(s),
            data: Some(data),
            ..
        } if s == "ok" && !data.is_null() => Ok(data),
        Envelope { message, .. } => Err(BrokerServiceError::RemoteRejected(
            message.unwrap_or_else(|| "unknown error".to_owned()),
        )),
    }
}

fn token_pair_from_data(data: Value) -> Result<TokenPair, BrokerServiceError> {
    #[derive(Deserialize)]
    struct TokenData {
        access_token: Option<String>,
        refresh_token: Option<String>,
    }
    let data: TokenData = serde_json::from_value(data)
        .map_err(|e| BrokerServiceError::RemoteRejected(format!("malformed token data: {e}")))?;
    let access_token = data.access_token.ok_or_else(|| {
        BrokerServiceError::RemoteRejected("response is missing access_token".to_owned())
    })?;
    Ok(TokenPair {
        access_token,
        refresh_token: data.refresh_token,
    })
}
