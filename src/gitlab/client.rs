//! GitLab REST API client
//!
//! Thin typed wrapper over the v4 endpoints the unfurler reads.

use anyhow::Context;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::models::{Commit, Issue, Job, MergeRequest, Note, Pipeline, Project};
use super::path::PathInfo;
use crate::core::config::AppConfig;
use crate::errors::UnfurlError;

const USER_AGENT: &str = "GitLab Unfurly";

pub struct GitLabClient {
    http: Client,
    base_url: Url,
}

impl GitLabClient {
    /// # Errors
    ///
    /// Returns an error if `GITLAB_URL` is not a valid URL, the token is not a
    /// valid header value, or the extra CA certificate cannot be loaded.
    pub fn new(config: &AppConfig) -> Result<Self, UnfurlError> {
        let base_url = Url::parse(&config.gitlab_url)?;

        let mut headers = HeaderMap::new();
        let mut token = HeaderValue::from_str(&config.gitlab_token)
            .map_err(|e| UnfurlError::ConfigError(format!("GITLAB_TOKEN: {e}")))?;
        token.set_sensitive(true);
        headers.insert("PRIVATE-TOKEN", token);

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30));

        if let Some(path) = &config.gitlab_ca_cert {
            builder = builder.add_root_certificate(load_certificate(path)?);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    /// Resolve a path relative to the GitLab instance, like a browser would.
    ///
    /// # Errors
    ///
    /// Returns `UnfurlError::ParseError` if the joined URL is invalid.
    pub fn web_url(&self, path: &str) -> Result<Url, UnfurlError> {
        Ok(self.base_url.join(path)?)
    }

    /// GET an API path and deserialize the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `UnfurlError::HttpError` on transport failures and
    /// `UnfurlError::GitLabError` on non-success statuses or unexpected bodies.
    pub async fn get_json<T: DeserializeOwned>(&self, api_path: &str) -> Result<T, UnfurlError> {
        let url = self.web_url(api_path)?;
        debug!(url = %url, "GitLab API request");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(UnfurlError::GitLabError(format!("{api_path}: HTTP {status}")));
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| UnfurlError::GitLabError(format!("{api_path}: unexpected response: {e}")))
    }

    /// # Errors
    /// Returns an error if the request or decoding fails.
    pub async fn issue(&self, info: &PathInfo) -> Result<Issue, UnfurlError> {
        let iid = info.require_identifier()?;
        self.get_json(&format!("/api/v4/projects/{}/issues/{iid}", info.quoted_id()))
            .await
    }

    /// # Errors
    /// Returns an error if the request or decoding fails.
    pub async fn issue_note(&self, info: &PathInfo) -> Result<Note, UnfurlError> {
        let iid = info.require_identifier()?;
        let note = info.require_note()?;
        self.get_json(&format!(
            "/api/v4/projects/{}/issues/{iid}/notes/{note}",
            info.quoted_id()
        ))
        .await
    }

    /// # Errors
    /// Returns an error if the request or decoding fails.
    pub async fn merge_request(&self, info: &PathInfo) -> Result<MergeRequest, UnfurlError> {
        let iid = info.require_identifier()?;
        self.get_json(&format!(
            "/api/v4/projects/{}/merge_requests/{iid}",
            info.quoted_id()
        ))
        .await
    }

    /// # Errors
    /// Returns an error if the request or decoding fails.
    pub async fn merge_request_note(&self, info: &PathInfo) -> Result<Note, UnfurlError> {
        let iid = info.require_identifier()?;
        let note = info.require_note()?;
        self.get_json(&format!(
            "/api/v4/projects/{}/merge_requests/{iid}/notes/{note}",
            info.quoted_id()
        ))
        .await
    }

    /// # Errors
    /// Returns an error if the request or decoding fails.
    pub async fn commit(&self, info: &PathInfo) -> Result<Commit, UnfurlError> {
        let sha = info.require_identifier()?;
        self.get_json(&format!(
            "/api/v4/projects/{}/repository/commits/{sha}",
            info.quoted_id()
        ))
        .await
    }

    /// # Errors
    /// Returns an error if the request or decoding fails.
    pub async fn project(&self, info: &PathInfo) -> Result<Project, UnfurlError> {
        self.get_json(&format!("/api/v4/projects/{}", info.quoted_id()))
            .await
    }

    /// # Errors
    /// Returns an error if the request or decoding fails.
    pub async fn pipeline(&self, info: &PathInfo) -> Result<Pipeline, UnfurlError> {
        let id = info.require_identifier()?;
        self.get_json(&format!(
            "/api/v4/projects/{}/pipelines/{id}",
            info.quoted_id()
        ))
        .await
    }

    /// # Errors
    /// Returns an error if the request or decoding fails.
    pub async fn job(&self, info: &PathInfo) -> Result<Job, UnfurlError> {
        let id = info.require_identifier()?;
        self.get_json(&format!("/api/v4/projects/{}/jobs/{id}", info.quoted_id()))
            .await
    }
}

fn load_certificate(path: &str) -> Result<reqwest::Certificate, UnfurlError> {
    let pem = std::fs::read(path).with_context(|| format!("reading GITLAB_CA_CERT {path}"))?;
    let cert = reqwest::Certificate::from_pem(&pem)
        .with_context(|| format!("parsing GITLAB_CA_CERT {path}"))?;
    Ok(cert)
}
