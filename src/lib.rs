//! GitLab Unfurly - previews of GitLab links shared in Slack.
//!
//! Slack sends a `link_shared` event when a message contains a link to the
//! configured GitLab domain. The Lambda parses each link into a GitLab
//! resource (project, issue, merge request, commit, pipeline, job or a
//! comment on an issue/merge request), reads it from the GitLab v4 API and
//! answers with `chat.unfurl` so Slack renders a preview attachment.
//!
//! Appending `?no_unfurl` to a link skips its preview.
//!
//! # Architecture
//!
//! The system uses:
//! - AWS Lambda behind an HTTP API gateway for serverless execution
//! - reqwest for the GitLab REST API and the Slack Web API
//! - slack-morphism for Slack identifier and token types
//! - Tokio for async runtime
//!
//! # Example
//!
//! ```no_run
//! use gitlab_unfurly::core::config::AppConfig;
//! use gitlab_unfurly::gitlab::{GitLabClient, parse_path};
//! use gitlab_unfurly::unfurl::unfurl_path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     gitlab_unfurly::setup_logging(false);
//!
//!     let config = AppConfig::from_env()?;
//!     let gitlab = GitLabClient::new(&config)?;
//!
//!     let info = parse_path("/platform/zoo/issues/6", None)?;
//!     let attachment = unfurl_path(&gitlab, &info).await?;
//!     println!("{}", serde_json::to_string_pretty(&attachment)?);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod core;
pub mod errors;
pub mod gitlab;
pub mod slack;
pub mod unfurl;

pub use errors::UnfurlError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// Logs at INFO, or DEBUG when `debug` is set (the `DEBUG` environment
/// variable) or the crate is built with the `debug-logs` feature. Calling it
/// more than once is harmless.
///
/// # Example
///
/// ```
/// gitlab_unfurly::setup_logging(false);
/// ```
pub fn setup_logging(debug: bool) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::prelude::*;

    let level = if debug || cfg!(feature = "debug-logs") {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(fmt_layer.with_filter(level))
        .try_init();
}
