//! Slack Web API client module
//!
//! Covers the two calls the unfurler makes: `chat.unfurl` and the OAuth
//! code exchange.

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use slack_morphism::{SlackApiToken, SlackApiTokenValue, SlackChannelId, SlackTs};
use std::time::Duration;
use tracing::info;

use crate::core::config::AppConfig;
use crate::core::models::Attachment;
use crate::errors::UnfurlError;

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Envelope every Slack Web API response shares.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    error: Option<String>,
    #[serde(flatten)]
    rest: serde_json::Map<String, Value>,
}

/// Team the app was installed into, as reported by `oauth.v2.access`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub team_id: Option<String>,
    pub team_name: Option<String>,
}

pub struct SlackClient {
    token: SlackApiToken,
    api_url: String,
}

impl SlackClient {
    #[must_use]
    pub fn new(token: String, api_url: &str) -> Self {
        Self {
            token: SlackApiToken::new(SlackApiTokenValue::new(token)),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.slack_token.clone(), &config.slack_api_url)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.api_url)
    }

    async fn parse_response(method: &str, resp: reqwest::Response) -> Result<Value, UnfurlError> {
        if !resp.status().is_success() {
            return Err(UnfurlError::ApiError(format!(
                "{method} HTTP {}",
                resp.status()
            )));
        }

        let body: ApiResponse = resp.json().await.map_err(|e| {
            UnfurlError::ApiError(format!("{method} JSON parse error: {e}"))
        })?;

        if !body.ok {
            return Err(UnfurlError::ApiError(format!(
                "{method} error: {}",
                body.error.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(Value::Object(body.rest))
    }

    /// Attach a preview to a link in an already posted message.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or Slack returns `ok: false`.
    pub async fn chat_unfurl(
        &self,
        channel: &SlackChannelId,
        ts: &SlackTs,
        url: &str,
        attachment: &Attachment,
    ) -> Result<(), UnfurlError> {
        let mut unfurls = serde_json::Map::new();
        unfurls.insert(url.to_string(), serde_json::to_value(attachment)?);
        let payload = json!({
            "channel": channel,
            "ts": ts,
            "unfurls": unfurls,
        });

        let resp = HTTP_CLIENT
            .post(self.method_url("chat.unfurl"))
            .bearer_auth(&self.token.token_value.0)
            .json(&payload)
            .send()
            .await?;

        Self::parse_response("chat.unfurl", resp).await?;
        info!(channel = %channel.0, url = %url, "Unfurl posted");
        Ok(())
    }

    /// Exchange an OAuth `code` for an installation.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or Slack rejects the code.
    pub async fn oauth_access(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> Result<Installation, UnfurlError> {
        let form = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
        ];

        let resp = HTTP_CLIENT
            .post(self.method_url("oauth.v2.access"))
            .form(&form)
            .send()
            .await?;

        let body = Self::parse_response("oauth.v2.access", resp).await?;
        let team = body.get("team");
        Ok(Installation {
            team_id: team
                .and_then(|t| t.get("id"))
                .and_then(Value::as_str)
                .map(str::to_string),
            team_name: team
                .and_then(|t| t.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}
