//! Turning shared GitLab links into Slack previews

pub mod attachments;
pub mod format;
pub mod links;

pub use attachments::unfurl_path;
