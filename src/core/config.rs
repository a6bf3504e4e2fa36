use std::env;

use crate::errors::UnfurlError;

pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gitlab_url: String,
    pub gitlab_token: String,
    pub gitlab_ca_cert: Option<String>,
    pub slack_token: String,
    pub slack_client_id: Option<String>,
    pub slack_client_secret: Option<String>,
    pub slack_signing_secret: Option<String>,
    pub slack_api_url: String,
    pub aws_region: Option<String>,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `UnfurlError::ConfigError` naming the first missing required variable.
    pub fn from_env() -> Result<Self, UnfurlError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `UnfurlError::ConfigError` naming the first missing required variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, UnfurlError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            optional(name).ok_or_else(|| UnfurlError::ConfigError(format!("{name} is not set")))
        };

        Ok(Self {
            gitlab_url: required("GITLAB_URL")?,
            gitlab_token: required("GITLAB_TOKEN")?,
            gitlab_ca_cert: optional("GITLAB_CA_CERT"),
            slack_token: required("SLACK_TOKEN")?,
            slack_client_id: optional("SLACK_CLIENT_ID"),
            slack_client_secret: optional("SLACK_CLIENT_SECRET"),
            slack_signing_secret: optional("SLACK_SIGNING_SECRET"),
            slack_api_url: optional("SLACK_API_URL")
                .unwrap_or_else(|| DEFAULT_SLACK_API_URL.to_string()),
            aws_region: optional("AWS_REGION"),
            debug: optional("DEBUG").is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn loads_required_and_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("GITLAB_URL", "https://gitlab.example.com"),
            ("GITLAB_TOKEN", "glpat"),
            ("SLACK_TOKEN", "xoxb"),
        ]))
        .unwrap();

        assert_eq!(config.gitlab_url, "https://gitlab.example.com");
        assert_eq!(config.slack_api_url, DEFAULT_SLACK_API_URL);
        assert!(config.slack_signing_secret.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn missing_required_variable_is_named() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("GITLAB_URL", "https://gitlab.example.com"),
            ("SLACK_TOKEN", "xoxb"),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("GITLAB_TOKEN"));
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("GITLAB_URL", "https://gitlab.example.com"),
            ("GITLAB_TOKEN", "glpat"),
            ("SLACK_TOKEN", "xoxb"),
            ("SLACK_SIGNING_SECRET", ""),
            ("DEBUG", "1"),
        ]))
        .unwrap();

        assert!(config.slack_signing_secret.is_none());
        assert!(config.debug);
    }
}
