use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnfurlError {
    #[error("Failed to parse request: {0}")]
    ParseError(String),

    #[error("Failed to access GitLab API: {0}")]
    GitLabError(String),

    #[error("Failed to access Slack API: {0}")]
    ApiError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for UnfurlError {
    fn from(error: reqwest::Error) -> Self {
        UnfurlError::HttpError(error.to_string())
    }
}

impl From<url::ParseError> for UnfurlError {
    fn from(error: url::ParseError) -> Self {
        UnfurlError::ParseError(format!("invalid URL: {error}"))
    }
}

impl From<serde_json::Error> for UnfurlError {
    fn from(error: serde_json::Error) -> Self {
        UnfurlError::ParseError(error.to_string())
    }
}

impl From<anyhow::Error> for UnfurlError {
    fn from(error: anyhow::Error) -> Self {
        UnfurlError::ConfigError(format!("{error:#}"))
    }
}
