use std::time::Duration;

use anyhow::{bail, Result};

use wabridge_api::*;

/// Typed HTTP client for the wabridge API.
///
/// One high-level method per endpoint; all methods are stateless apart from
/// the base URL (the API itself carries no per-request auth tokens).
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client with the given base URL and timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    // ── Health ────────────────────────────────────────────────────────────

    pub async fn health(&self) -> Result<HealthResponse> {
        let resp = self.client.get(self.url("/health")).send().await?;
        parse_response(resp).await
    }

    // ── Linking ───────────────────────────────────────────────────────────

    pub async fn link(&self, req: &LinkSessionRequest) -> Result<LinkSessionResponse> {
        let resp = self
            .client
            .post(self.url("/link"))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    // ── Sessions ──────────────────────────────────────────────────────────

    pub async fn get_session(&self, session_id: &str) -> Result<SessionRecord> {
        let resp = self
            .client
            .get(self.url(&format!("/session/{session_id}")))
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn update_session(
        &self,
        session_id: &str,
        req: &UpdateSessionRequest,
    ) -> Result<SessionRecord> {
        let resp = self
            .client
            .put(self.url(&format!("/session/{session_id}")))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// The cheap status read the poller loops on.
    pub async fn session_status(&self, session_id: &str) -> Result<SessionStatusResponse> {
        let resp = self
            .client
            .get(self.url(&format!("/session-status/{session_id}")))
            .send()
            .await?;
        parse_response(resp).await
    }

    // ── Admin ─────────────────────────────────────────────────────────────

    pub async fn admin_login(&self, req: &AdminLoginRequest) -> Result<AdminLoginResponse> {
        let resp = self
            .client
            .post(self.url("/admin/login"))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn admin_sessions(&self) -> Result<AdminSessionsResponse> {
        let resp = self.client.get(self.url("/admin/sessions")).send().await?;
        parse_response(resp).await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<MessageResponse> {
        let resp = self
            .client
            .delete(self.url(&format!("/admin/sessions/{session_id}")))
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn admin_settings(&self) -> Result<AdminSettingsView> {
        let resp = self.client.get(self.url("/admin/settings")).send().await?;
        parse_response(resp).await
    }

    pub async fn update_admin_settings(
        &self,
        req: &UpdateAdminSettingsRequest,
    ) -> Result<AdminSettingsView> {
        let resp = self
            .client
            .put(self.url("/admin/settings"))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    // ── Bot settings ──────────────────────────────────────────────────────

    pub async fn bot_settings(&self, session_id: &str) -> Result<BotSettingsRecord> {
        let resp = self
            .client
            .get(self.url(&format!("/bot-settings/{session_id}")))
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn update_bot_settings(
        &self,
        session_id: &str,
        req: &UpdateBotSettingsRequest,
    ) -> Result<BotSettingsRecord> {
        let resp = self
            .client
            .put(self.url(&format!("/bot-settings/{session_id}")))
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }
}

/// Parse an HTTP response: return the deserialized body on 2xx,
/// or an error containing the status and body text.
async fn parse_response<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("{status}: {body}");
    }
    Ok(resp.json().await?)
}
