//! Parsing of GitLab web URL paths into API lookups.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::UnfurlError;

static RESOURCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^/(?P<team>[\w-]+)/(?P<subgroups>[\w/-]*?)/?(?P<project>[\w-]+)/-?/?(?P<type>issues|merge_requests|commit|pipelines|jobs)/(?P<identifier>\w+)/?$",
    )
    .expect("static regex compile")
});

static PROJECT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/(?P<team>[\w-]+)/(?P<subgroups>[\w/-]*?)/?(?P<project>[\w-]+)/?$")
        .expect("static regex compile")
});

static NOTE_FRAGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^note_(?P<id>\d+)$").expect("static regex compile"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathType {
    Project,
    Commit,
    MergeRequest,
    Issue,
    Pipeline,
    Job,
    IssueNote,
    MergeRequestNote,
}

impl PathType {
    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "issues" => Some(Self::Issue),
            "merge_requests" => Some(Self::MergeRequest),
            "commit" => Some(Self::Commit),
            "pipelines" => Some(Self::Pipeline),
            "jobs" => Some(Self::Job),
            _ => None,
        }
    }

    /// The note variant of this type, if GitLab supports comment anchors for it.
    fn with_note(self) -> Option<Self> {
        match self {
            Self::Issue => Some(Self::IssueNote),
            Self::MergeRequest => Some(Self::MergeRequestNote),
            _ => None,
        }
    }
}

impl fmt::Display for PathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Project => "project",
            Self::Commit => "commit",
            Self::MergeRequest => "merge_requests",
            Self::Issue => "issues",
            Self::Pipeline => "pipelines",
            Self::Job => "jobs",
            Self::IssueNote => "note_issues",
            Self::MergeRequestNote => "note_merge_requests",
        };
        f.write_str(name)
    }
}

/// A GitLab resource reference extracted from a web URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathInfo {
    pub path_type: PathType,
    pub team: String,
    pub project: String,
    pub identifier: Option<String>,
    pub subgroups: Option<String>,
    pub note: Option<String>,
}

impl PathInfo {
    #[must_use]
    pub fn new(path_type: PathType, team: &str, project: &str) -> Self {
        Self {
            path_type,
            team: team.to_string(),
            project: project.to_string(),
            identifier: None,
            subgroups: None,
            note: None,
        }
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: &str) -> Self {
        self.identifier = Some(identifier.to_string());
        self
    }

    #[must_use]
    pub fn with_subgroups(mut self, subgroups: &str) -> Self {
        self.subgroups = Some(subgroups.to_string());
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    /// Full project path, URL-encoded so GitLab accepts it as a project id.
    #[must_use]
    pub fn quoted_id(&self) -> String {
        let full_path = match &self.subgroups {
            Some(subgroups) => format!("{}/{}/{}", self.team, subgroups, self.project),
            None => format!("{}/{}", self.team, self.project),
        };
        urlencoding::encode(&full_path).into_owned()
    }

    /// # Errors
    ///
    /// Returns `UnfurlError::ParseError` when the path has no identifier.
    pub fn require_identifier(&self) -> Result<&str, UnfurlError> {
        self.identifier.as_deref().ok_or_else(|| {
            UnfurlError::ParseError(format!("{} path without identifier", self.path_type))
        })
    }

    /// # Errors
    ///
    /// Returns `UnfurlError::ParseError` when the path has no note id.
    pub fn require_note(&self) -> Result<&str, UnfurlError> {
        self.note.as_deref().ok_or_else(|| {
            UnfurlError::ParseError(format!("{} path without note id", self.path_type))
        })
    }
}

/// Parse the path (and optional fragment) of a GitLab web URL.
///
/// A `note_<id>` fragment on an issue or merge request turns the reference
/// into a comment reference; other fragments are ignored.
///
/// # Errors
///
/// Returns `UnfurlError::ParseError` if the path matches neither a resource
/// nor a project.
pub fn parse_path(path: &str, fragment: Option<&str>) -> Result<PathInfo, UnfurlError> {
    if let Some(caps) = RESOURCE_RE.captures(path) {
        let segment = &caps["type"];
        let base_type = PathType::from_segment(segment)
            .ok_or_else(|| UnfurlError::ParseError(format!("Unknown path type: {segment}")))?;

        let note = fragment
            .and_then(|f| NOTE_FRAGMENT_RE.captures(f))
            .map(|c| c["id"].to_string());

        let (path_type, note) = match (note, base_type.with_note()) {
            (Some(note), Some(note_type)) => (note_type, Some(note)),
            _ => (base_type, None),
        };

        return Ok(PathInfo {
            path_type,
            team: caps["team"].to_string(),
            project: caps["project"].to_string(),
            identifier: Some(caps["identifier"].to_string()),
            subgroups: non_empty(&caps["subgroups"]),
            note,
        });
    }

    if let Some(caps) = PROJECT_RE.captures(path) {
        return Ok(PathInfo {
            path_type: PathType::Project,
            team: caps["team"].to_string(),
            project: caps["project"].to_string(),
            identifier: None,
            subgroups: non_empty(&caps["subgroups"]),
            note: None,
        });
    }

    Err(UnfurlError::ParseError(format!("Can't parse path: {path}")))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim_matches('/');
    (!value.is_empty()).then(|| value.to_string())
}
