//! Everything that talks to or understands GitLab

pub mod client;
pub mod models;
pub mod path;

pub use client::GitLabClient;
pub use path::{PathInfo, PathType, parse_path};
