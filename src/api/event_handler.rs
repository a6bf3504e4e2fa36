//! Handler for Slack Events API callbacks.
//!
//! This module processes:
//! - `url_verification` - the handshake Slack sends when the endpoint is configured
//! - `event_callback` / `link_shared` - a message containing GitLab links was posted

use futures::future::join_all;
use serde_json::Value;
use tracing::{error, info, warn};

use super::helpers::{err_response, no_content, ok_text};
use crate::core::config::AppConfig;
use crate::core::models::{LinkSharedEvent, SharedLink, SlackEnvelope, SlackEvent};
use crate::errors::UnfurlError;
use crate::gitlab::{GitLabClient, parse_path};
use crate::slack::SlackClient;
use crate::unfurl::links::{is_unfurl_suppressed, parse_shared_url};
use crate::unfurl::unfurl_path;

/// What happened to a single shared link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Unfurled,
    Suppressed,
    Unrecognized,
    Failed(String),
}

/// Handle an Events API request body.
///
/// Returns the gateway response to send back to Slack. Per-link failures are
/// logged and still acknowledged so Slack does not redeliver the event.
pub async fn handle_event_callback(config: &AppConfig, body: &str) -> Value {
    let envelope: SlackEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            error!("Failed to parse Slack event: {}", e);
            return err_response(400, &format!("Parse Error: {e}"));
        }
    };

    match envelope {
        SlackEnvelope::UrlVerification { challenge } => {
            info!("Answering Slack URL verification");
            ok_text(&challenge)
        }
        SlackEnvelope::EventCallback {
            event: SlackEvent::LinkShared(event),
        } => {
            let outcomes = unfurl_links(config, &event).await;
            let unfurled = outcomes
                .iter()
                .filter(|o| **o == LinkOutcome::Unfurled)
                .count();
            info!(
                channel = %event.channel.0,
                links = outcomes.len(),
                unfurled,
                "Processed link_shared event"
            );
            no_content()
        }
        SlackEnvelope::EventCallback {
            event: SlackEvent::Other,
        }
        | SlackEnvelope::Other => no_content(),
    }
}

/// Unfurl every link of a `link_shared` event, one outcome per link.
pub async fn unfurl_links(config: &AppConfig, event: &LinkSharedEvent) -> Vec<LinkOutcome> {
    let gitlab = match GitLabClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to initialize GitLab client: {}", e);
            return vec![LinkOutcome::Failed(e.to_string()); event.links.len()];
        }
    };
    let slack = SlackClient::from_config(config);

    join_all(
        event
            .links
            .iter()
            .map(|link| unfurl_link(&gitlab, &slack, event, link)),
    )
    .await
}

#[tracing::instrument(level = "info", skip_all, fields(url = %link.url))]
async fn unfurl_link(
    gitlab: &GitLabClient,
    slack: &SlackClient,
    event: &LinkSharedEvent,
    link: &SharedLink,
) -> LinkOutcome {
    let url = match parse_shared_url(&link.url) {
        Ok(url) => url,
        Err(e) => {
            warn!("Can't parse shared URL: {}", e);
            return LinkOutcome::Unrecognized;
        }
    };

    if is_unfurl_suppressed(&url) {
        info!("Skipping URL as requested");
        return LinkOutcome::Suppressed;
    }

    let path_info = match parse_path(url.path(), url.fragment()) {
        Ok(info) => info,
        Err(e) => {
            warn!("Can't parse path: {}", e);
            return LinkOutcome::Unrecognized;
        }
    };

    let result: Result<(), UnfurlError> = async {
        let mut attachment = unfurl_path(gitlab, &path_info).await?;
        attachment.title_link = Some(link.url.clone());
        slack
            .chat_unfurl(&event.channel, &event.message_ts, &link.url, &attachment)
            .await
    }
    .await;

    match result {
        Ok(()) => LinkOutcome::Unfurled,
        Err(e) => {
            error!(path_type = %path_info.path_type, "Failed to unfurl link: {}", e);
            LinkOutcome::Failed(e.to_string())
        }
    }
}
