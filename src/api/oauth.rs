use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::info;

use crate::core::config::AppConfig;
use crate::errors::UnfurlError;
use crate::slack::{Installation, SlackClient};

const SCOPES: [&str; 2] = ["links:read", "links:write"];

#[must_use]
pub fn build_authorize_url(client_id: &str) -> String {
    let scopes = SCOPES.join(",");
    let client_id = utf8_percent_encode(client_id, NON_ALPHANUMERIC);
    format!("https://slack.com/oauth/v2/authorize?scope={scopes}&client_id={client_id}")
}

/// "Add to Slack" landing page.
///
/// # Errors
///
/// Returns `UnfurlError::ConfigError` if `SLACK_CLIENT_ID` is not configured.
pub fn start_page(config: &AppConfig) -> Result<String, UnfurlError> {
    let client_id = config
        .slack_client_id
        .as_deref()
        .ok_or_else(|| UnfurlError::ConfigError("SLACK_CLIENT_ID is not set".to_string()))?;

    Ok(format!(
        "<a href=\"{}\">\n    Add to Slack\n</a>\n",
        build_authorize_url(client_id)
    ))
}

#[must_use]
pub fn finish_page() -> &'static str {
    "<meta charset='utf-8'> <h1>👌</h1>"
}

/// Exchange the OAuth code Slack redirected back with.
///
/// # Errors
///
/// Returns an error if the client credentials are not configured or Slack
/// rejects the exchange.
pub async fn handle_callback(
    config: &AppConfig,
    slack: &SlackClient,
    code: &str,
) -> Result<Installation, UnfurlError> {
    let (Some(client_id), Some(client_secret)) = (
        config.slack_client_id.as_deref(),
        config.slack_client_secret.as_deref(),
    ) else {
        return Err(UnfurlError::ConfigError(
            "SLACK_CLIENT_ID and SLACK_CLIENT_SECRET must be set".to_string(),
        ));
    };

    let installation = slack.oauth_access(client_id, client_secret, code).await?;
    info!(
        team_id = installation.team_id.as_deref().unwrap_or("unknown"),
        team_name = installation.team_name.as_deref().unwrap_or("unknown"),
        "Slack app installed"
    );
    Ok(installation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_requests_link_scopes() {
        assert_eq!(
            build_authorize_url("123.456"),
            "https://slack.com/oauth/v2/authorize?scope=links:read,links:write&client_id=123%2E456"
        );
    }
}
