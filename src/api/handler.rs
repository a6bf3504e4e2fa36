//! Lambda handler - thin router that delegates to specialized handlers.
//!
//! This module handles:
//! - OAuth install routes (delegated to `oauth` module)
//! - Request validation (body, optional Slack signature)
//! - Event callbacks (delegated to `event_handler` module)

use super::{event_handler, helpers, oauth, parsing, signature};
use crate::core::config::AppConfig;
use crate::slack::SlackClient;
use lambda_runtime::{Error, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

pub use self::function_handler as handler;

/// Lambda handler for the single HTTP entrypoint.
///
/// # Errors
///
/// Fails only when the configuration cannot be loaded; every other problem
/// is reported through the HTTP response.
#[tracing::instrument(level = "info", skip(event), fields(request_id = %event.context.request_id))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<impl Serialize, Error> {
    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;
    info!(
        aws_region = config.aws_region.as_deref().unwrap_or("unset"),
        "API Lambda received request"
    );

    Ok(route_request(&config, &event.payload).await)
}

/// Route one API Gateway proxy event and build its response.
pub async fn route_request(config: &AppConfig, payload: &Value) -> Value {
    let correlation_id = Uuid::new_v4();
    let path = parsing::request_path(payload).unwrap_or("");
    info!(%correlation_id, raw_path = %path, "Received request");

    // ========================================================================
    // OAuth routes (not signed by Slack)
    // ========================================================================

    if path.ends_with("/auth/slack/start") {
        return handle_oauth_start(config);
    }

    if path.ends_with("/auth/slack/callback") {
        return handle_oauth_callback(config, payload).await;
    }

    // ========================================================================
    // Events API
    // ========================================================================

    let body = match parsing::request_body(payload) {
        Ok(b) => b,
        Err(e) => {
            error!("Invalid request: {}", e);
            return helpers::err_response(400, &e.to_string());
        }
    };

    if let Some(secret) = config.slack_signing_secret.as_deref() {
        if let Err(response) = verify_signature(&body, payload, secret) {
            return response;
        }
        info!("Slack signature verified successfully");
    }

    event_handler::handle_event_callback(config, &body).await
}

// ============================================================================
// OAuth Handlers
// ============================================================================

fn handle_oauth_start(config: &AppConfig) -> Value {
    match oauth::start_page(config) {
        Ok(html) => helpers::ok_html(&html),
        Err(e) => {
            error!("OAuth start failed: {}", e);
            helpers::err_response(500, &e.to_string())
        }
    }
}

async fn handle_oauth_callback(config: &AppConfig, payload: &Value) -> Value {
    let Some(code) = parsing::query_param(payload, "code") else {
        return helpers::err_response(400, "missing code");
    };

    let slack = SlackClient::from_config(config);
    match oauth::handle_callback(config, &slack, &code).await {
        Ok(_) => helpers::ok_html(oauth::finish_page()),
        Err(e) => {
            error!("OAuth callback failed: {}", e);
            helpers::err_response(400, &e.to_string())
        }
    }
}

// ============================================================================
// Request Validation Helpers
// ============================================================================

fn verify_signature(body: &str, payload: &Value, secret: &str) -> Result<(), Value> {
    let Some(headers) = payload.get("headers") else {
        error!("Request missing headers");
        return Err(helpers::err_response(401, "Missing headers"));
    };

    let Some(sig) = parsing::get_header_value(headers, "X-Slack-Signature") else {
        error!("Missing X-Slack-Signature header");
        return Err(helpers::err_response(
            401,
            "Missing X-Slack-Signature header",
        ));
    };

    let Some(timestamp) = parsing::get_header_value(headers, "X-Slack-Request-Timestamp") else {
        error!("Missing X-Slack-Request-Timestamp header");
        return Err(helpers::err_response(
            401,
            "Missing X-Slack-Request-Timestamp header",
        ));
    };

    if !signature::verify_slack_signature(body, timestamp, sig, secret) {
        error!("Slack signature verification failed");
        return Err(helpers::err_response(401, "Invalid Slack signature"));
    }

    Ok(())
}
