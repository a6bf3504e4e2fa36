//! Rendering of GitLab resources as Slack attachments.
//!
//! Each builder is a pure function of the API data so it can be tested
//! without a GitLab instance; [`unfurl_path`] fetches what a path needs
//! and picks the builder.

use tracing::debug;

use super::format::{
    DEFAULT_DESCRIPTION_WIDTH, LONG_DESCRIPTION_WIDTH, ci_color, format_user, issue_color,
    merge_request_color, prepare_description, slack_formatted_date, slack_formatted_datetime,
};
use crate::core::models::{Attachment, AttachmentField};
use crate::errors::UnfurlError;
use crate::gitlab::models::{Commit, Issue, Job, MergeRequest, Milestone, Note, Pipeline, Project};
use crate::gitlab::{GitLabClient, PathInfo, PathType};

const NOBODY: &str = "_nobody_";

/// Fetch the resource a path points at and render it.
///
/// # Errors
///
/// Returns an error if any GitLab request fails or the path lacks the
/// identifiers its type needs.
pub async fn unfurl_path(client: &GitLabClient, info: &PathInfo) -> Result<Attachment, UnfurlError> {
    debug!(path_type = %info.path_type, project = %info.quoted_id(), "Rendering GitLab resource");

    match info.path_type {
        PathType::Issue => Ok(issue_attachment(&client.issue(info).await?)),
        PathType::IssueNote => {
            let (note, issue) = futures::try_join!(client.issue_note(info), client.issue(info))?;
            Ok(issue_note_attachment(&note, &issue))
        }
        PathType::MergeRequest => Ok(merge_request_attachment(&client.merge_request(info).await?)),
        PathType::MergeRequestNote => {
            let (note, mr) = futures::try_join!(
                client.merge_request_note(info),
                client.merge_request(info)
            )?;
            Ok(merge_request_note_attachment(&note, &mr))
        }
        PathType::Commit => Ok(commit_attachment(&client.commit(info).await?)),
        PathType::Project => {
            let project = client.project(info).await?;
            let namespace_url = client.web_url(&project.namespace.full_path)?;
            Ok(project_attachment(&project, namespace_url.as_str()))
        }
        PathType::Pipeline => Ok(pipeline_attachment(&client.pipeline(info).await?)),
        PathType::Job => Ok(job_attachment(&client.job(info).await?)),
    }
}

fn title_with_state(title: &str, state: &str) -> String {
    let title = title.trim();
    if state == "opened" {
        title.to_string()
    } else {
        format!("{title} ({state})")
    }
}

fn milestone_field(milestone: Option<&Milestone>) -> Option<AttachmentField> {
    milestone.map(|m| AttachmentField::short("Milestone", format!("<{}|{}>", m.web_url, m.title)))
}

fn timing_fields(started_at: Option<&str>, finished_at: Option<&str>) -> Vec<AttachmentField> {
    let mut fields = Vec::new();
    if let Some(started) = started_at {
        fields.push(AttachmentField::short(
            "Started at",
            slack_formatted_datetime(started),
        ));
    }
    if let Some(finished) = finished_at {
        fields.push(AttachmentField::short(
            "Finished at",
            slack_formatted_datetime(finished),
        ));
    }
    fields
}

#[must_use]
pub fn issue_attachment(issue: &Issue) -> Attachment {
    let assignee = if issue.assignees.is_empty() {
        NOBODY.to_string()
    } else {
        issue
            .assignees
            .iter()
            .map(|u| format_user(u, true))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut fields = vec![AttachmentField::short("Assignee", assignee)];
    if let Some(due_date) = issue.due_date.as_deref() {
        fields.push(AttachmentField::short(
            "Due date",
            slack_formatted_date(due_date),
        ));
    }
    fields.extend(milestone_field(issue.milestone.as_ref()));

    Attachment {
        author_name: Some(format_user(&issue.author, false)),
        author_link: Some(issue.author.web_url.clone()),
        author_icon: issue.author.avatar_url.clone(),
        title: title_with_state(&issue.title, &issue.state),
        fields,
        text: Some(prepare_description(
            issue.description.as_deref().unwrap_or_default(),
            LONG_DESCRIPTION_WIDTH,
        )),
        color: issue_color(&issue.state),
        ts: issue.created_at.timestamp(),
        footer: "Issue".to_string(),
        ..Attachment::default()
    }
}

#[must_use]
pub fn issue_note_attachment(note: &Note, issue: &Issue) -> Attachment {
    Attachment {
        author_name: Some(format_user(&note.author, true)),
        author_link: Some(note.author.web_url.clone()),
        author_icon: note.author.avatar_url.clone(),
        title: format!("Comment on issue: {}", issue.title.trim()),
        text: Some(prepare_description(&note.body, LONG_DESCRIPTION_WIDTH)),
        color: issue_color(&issue.state),
        ts: note.created_at.timestamp(),
        footer: "Issue note".to_string(),
        ..Attachment::default()
    }
}

#[must_use]
pub fn merge_request_attachment(mr: &MergeRequest) -> Attachment {
    let assignee = mr
        .assignee
        .as_ref()
        .map_or_else(|| NOBODY.to_string(), |u| format_user(u, true));

    let mut fields = vec![AttachmentField::short("Assignee", assignee)];
    if let Some(diffs) = mr.changes_count.as_deref().filter(|c| !c.is_empty()) {
        fields.push(AttachmentField::short("Diffs", diffs));
    }
    fields.extend(milestone_field(mr.milestone.as_ref()));

    Attachment {
        author_name: Some(format_user(&mr.author, false)),
        author_link: Some(mr.author.web_url.clone()),
        author_icon: mr.author.avatar_url.clone(),
        title: title_with_state(&mr.title, &mr.state),
        fields,
        text: Some(prepare_description(
            mr.description.as_deref().unwrap_or_default(),
            DEFAULT_DESCRIPTION_WIDTH,
        )),
        color: merge_request_color(&mr.state),
        ts: mr.created_at.timestamp(),
        footer: "Merge Request".to_string(),
        ..Attachment::default()
    }
}

#[must_use]
pub fn merge_request_note_attachment(note: &Note, mr: &MergeRequest) -> Attachment {
    Attachment {
        author_name: Some(format_user(&note.author, false)),
        author_link: Some(note.author.web_url.clone()),
        author_icon: note.author.avatar_url.clone(),
        title: format!("Comment on merge request: {}", mr.title.trim()),
        text: Some(prepare_description(&note.body, LONG_DESCRIPTION_WIDTH)),
        color: merge_request_color(&mr.state),
        ts: note.created_at.timestamp(),
        footer: "Merge Request Note".to_string(),
        ..Attachment::default()
    }
}

#[must_use]
pub fn commit_attachment(commit: &Commit) -> Attachment {
    Attachment {
        author_name: Some(commit.author_name.trim().to_string()),
        title: commit.title.trim().to_string(),
        ts: commit.created_at.timestamp(),
        footer: "Commit".to_string(),
        ..Attachment::default()
    }
}

/// `namespace_url` is the web URL of the owning group or user.
#[must_use]
pub fn project_attachment(project: &Project, namespace_url: &str) -> Attachment {
    Attachment {
        author_name: Some(project.namespace.name.clone()),
        author_link: Some(namespace_url.to_string()),
        thumb_url: project.avatar_url.clone(),
        title: project.name.clone(),
        text: Some(prepare_description(
            project.description.as_deref().unwrap_or_default(),
            DEFAULT_DESCRIPTION_WIDTH,
        )),
        ts: project.created_at.timestamp(),
        footer: "Project".to_string(),
        ..Attachment::default()
    }
}

#[must_use]
pub fn pipeline_attachment(pipeline: &Pipeline) -> Attachment {
    let mut fields = vec![
        AttachmentField::short("Status", pipeline.status.as_str()),
        AttachmentField::short("Ref", pipeline.git_ref.as_str()),
    ];
    fields.extend(timing_fields(
        pipeline.started_at.as_deref(),
        pipeline.finished_at.as_deref(),
    ));

    Attachment {
        author_name: Some(format_user(&pipeline.user, false)),
        author_link: Some(pipeline.user.web_url.clone()),
        author_icon: pipeline.user.avatar_url.clone(),
        title: format!("Pipeline #{}", pipeline.id),
        fields,
        color: ci_color(&pipeline.status),
        ts: pipeline.created_at.timestamp(),
        footer: "Pipeline".to_string(),
        ..Attachment::default()
    }
}

#[must_use]
pub fn job_attachment(job: &Job) -> Attachment {
    let mut fields = vec![
        AttachmentField::short("Status", job.status.as_str()),
        AttachmentField::short("Stage", job.stage.as_str()),
    ];
    fields.extend(timing_fields(
        job.started_at.as_deref(),
        job.finished_at.as_deref(),
    ));
    if let Some(duration) = job.duration.filter(|d| *d > 0.0) {
        fields.push(AttachmentField::short("Duration", format_duration(duration)));
    }

    Attachment {
        author_name: Some(format_user(&job.user, false)),
        author_link: Some(job.user.web_url.clone()),
        author_icon: job.user.avatar_url.clone(),
        title: format!("Job #{}: {}", job.id, job.name),
        fields,
        color: ci_color(&job.status),
        ts: job.created_at.timestamp(),
        footer: "Pipeline Job".to_string(),
        ..Attachment::default()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn format_duration(seconds: f64) -> String {
    let total = seconds.round() as u64;
    let (minutes, secs) = (total / 60, total % 60);
    if minutes == 0 {
        format!("{secs}s")
    } else {
        format!("{minutes}m {secs}s")
    }
}
