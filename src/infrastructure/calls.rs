//! HTTP implementation of the call-session capability.
//!
//! Talks to a Cloudflare-Calls-shaped REST API: `POST
//! {base}/{app_id}/sessions/new` creates a session, `POST
//! {base}/{app_id}/sessions/{id}/tokens/new` mints a join token.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AppError, CallSession, CallSessionProvider, CallToken};

pub const DEFAULT_CALLS_BASE_URL: &str = "https://rtc.live.cloudflare.com/v1/apps";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const TOKEN_TTL_SECONDS: u64 = 3600;

pub struct HttpCallSessionProvider {
    app_id: String,
    app_secret: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MintTokenRequest<'a> {
    session_id: &'a str,
    ttl: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MintTokenResponse {
    token: String,
    expires_at: DateTime<Utc>,
}

impl HttpCallSessionProvider {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self::with_base_url(app_id, app_secret, DEFAULT_CALLS_BASE_URL)
    }

    pub fn with_base_url(
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn check_credentials(&self) -> Result<(), AppError> {
        if self.app_id.is_empty() || self.app_secret.is_empty() {
            return Err(AppError::Internal(
                "call provider credentials not configured".into(),
            ));
        }
        Ok(())
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        url: String,
        body: &B,
    ) -> Result<R, AppError> {
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.app_secret)
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("call provider request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "call provider error (status {status}): {body}"
            )));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| AppError::Internal(format!("invalid call provider response: {e}")))
    }
}

#[async_trait]
impl CallSessionProvider for HttpCallSessionProvider {
    async fn create_session(&self, room_id: &str) -> Result<CallSession, AppError> {
        self.check_credentials()?;
        tracing::info!(room_id, "creating call session");

        let url = format!("{}/{}/sessions/new", self.base_url, self.app_id);
        let response: CreateSessionResponse =
            self.post_json(url, &serde_json::json!({})).await?;

        Ok(CallSession {
            session_id: response.session_id,
        })
    }

    async fn mint_token(&self, session_id: &str) -> Result<CallToken, AppError> {
        self.check_credentials()?;

        let url = format!(
            "{}/{}/sessions/{}/tokens/new",
            self.base_url, self.app_id, session_id
        );
        let request = MintTokenRequest {
            session_id,
            ttl: TOKEN_TTL_SECONDS,
        };
        let response: MintTokenResponse = self.post_json(url, &request).await?;

        Ok(CallToken {
            token: response.token,
            expires_at: response.expires_at,
        })
    }
}
