use gitlab_unfurly::core::config::AppConfig;
use gitlab_unfurly::core::models::{Attachment, AttachmentField};
use gitlab_unfurly::errors::UnfurlError;
use gitlab_unfurly::gitlab::{GitLabClient, PathInfo, PathType};
use gitlab_unfurly::unfurl::unfurl_path;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(gitlab_url: &str) -> AppConfig {
    AppConfig {
        gitlab_url: gitlab_url.to_string(),
        gitlab_token: "glpat-test".to_string(),
        gitlab_ca_cert: None,
        slack_token: "xoxb-test".to_string(),
        slack_client_id: None,
        slack_client_secret: None,
        slack_signing_secret: None,
        slack_api_url: "http://127.0.0.1:9".to_string(),
        aws_region: None,
        debug: false,
    }
}

fn user(username: &str) -> Value {
    json!({
        "id": 1,
        "name": "Administrator",
        "username": username,
        "state": "active",
        "avatar_url": null,
        "web_url": format!("https://gitlab.example.com/{username}")
    })
}

fn merge_request_body() -> Value {
    json!({
        "id": 1,
        "iid": 1,
        "project_id": 3,
        "title": "test1",
        "description": "fixed login page css paddings",
        "state": "merged",
        "created_at": "2017-04-29T08:46:00Z",
        "updated_at": "2017-04-29T08:46:00Z",
        "target_branch": "master",
        "source_branch": "test1",
        "author": user("admin"),
        "assignee": user("admin"),
        "assignees": [user("axel.block")],
        "labels": ["Community contribution", "Manage"],
        "milestone": {
            "id": 5,
            "iid": 1,
            "project_id": 3,
            "title": "v2.0",
            "state": "closed",
            "due_date": "2018-09-22",
            "web_url": "https://gitlab.example.com/my-group/my-project/milestones/1"
        },
        "merge_status": "can_be_merged",
        "sha": "8888888888888888888888888888888888888888",
        "web_url": "http://gitlab.example.com/my-group/my-project/merge_requests/1",
        "changes_count": "1",
        "pipeline": {
            "id": 29626725,
            "ref": "patch-28",
            "status": "success"
        }
    })
}

fn merge_request_path() -> PathInfo {
    PathInfo::new(PathType::MergeRequest, "test_team", "test_project")
        .with_identifier("test_id")
        .with_subgroups("test_subgroup")
}

const MR_API_PATH: &str =
    "/api/v4/projects/test_team%2Ftest_subgroup%2Ftest_project/merge_requests/test_id";

#[tokio::test]
async fn test_merge_request_unfurl_happy_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MR_API_PATH))
        .and(header("PRIVATE-TOKEN", "glpat-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(merge_request_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitLabClient::new(&test_config(&server.uri())).unwrap();
    let attachment = unfurl_path(&client, &merge_request_path()).await.unwrap();

    let expected = Attachment {
        author_name: Some("admin".to_string()),
        author_link: Some("https://gitlab.example.com/admin".to_string()),
        author_icon: None,
        title: "test1 (merged)".to_string(),
        fields: vec![
            AttachmentField::short("Assignee", "admin"),
            AttachmentField::short("Diffs", "1"),
            AttachmentField::short(
                "Milestone",
                "<https://gitlab.example.com/my-group/my-project/milestones/1|v2.0>",
            ),
        ],
        text: Some("fixed login page css paddings".to_string()),
        color: Some("#1f78d1".to_string()),
        ts: 1_493_455_560,
        footer: "Merge Request".to_string(),
        ..Attachment::default()
    };
    assert_eq!(attachment, expected);
}

#[tokio::test]
async fn test_empty_api_response_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MR_API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let client = GitLabClient::new(&test_config(&server.uri())).unwrap();
    let result = unfurl_path(&client, &merge_request_path()).await;

    assert!(matches!(result, Err(UnfurlError::GitLabError(_))));
}

#[tokio::test]
async fn test_not_found_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "404 Not found"})))
        .mount(&server)
        .await;

    let client = GitLabClient::new(&test_config(&server.uri())).unwrap();
    let err = unfurl_path(&client, &merge_request_path())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("404"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_issue_note_fetches_note_and_issue() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/kiwi%2Fx%2Fy%2Fcom/issues/37/notes/746624"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 746624,
            "body": "Reproduced on <i>staging</i> as well.",
            "author": user("axel.block"),
            "created_at": "2018-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/kiwi%2Fx%2Fy%2Fcom/issues/37"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Crash on start ",
            "description": null,
            "state": "opened",
            "due_date": null,
            "milestone": null,
            "assignees": [],
            "author": user("admin"),
            "created_at": "2017-04-29T08:46:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitLabClient::new(&test_config(&server.uri())).unwrap();
    let info = PathInfo::new(PathType::IssueNote, "kiwi", "com")
        .with_identifier("37")
        .with_subgroups("x/y")
        .with_note("746624");
    let attachment = unfurl_path(&client, &info).await.unwrap();

    assert_eq!(attachment.title, "Comment on issue: Crash on start");
    assert_eq!(
        attachment.text.as_deref(),
        Some("Reproduced on staging as well.")
    );
    assert_eq!(attachment.author_name.as_deref(), Some("axel.block"));
    assert_eq!(attachment.color.as_deref(), Some("#1aaa55"));
    assert_eq!(attachment.footer, "Issue note");
    assert_eq!(attachment.ts, 1_514_764_800);
}

#[tokio::test]
async fn test_project_links_namespace_on_instance() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/fbi%2Fa%2Fb%2Fc%2Fjail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4,
            "name": "jail",
            "description": "Where the <b>bad</b> guys go",
            "avatar_url": null,
            "namespace": { "id": 2, "name": "c", "path": "c", "full_path": "fbi/a/b/c" },
            "created_at": "2017-04-29T08:46:00.000Z"
        })))
        .mount(&server)
        .await;

    let client = GitLabClient::new(&test_config(&server.uri())).unwrap();
    let info = PathInfo::new(PathType::Project, "fbi", "jail").with_subgroups("a/b/c");
    let attachment = unfurl_path(&client, &info).await.unwrap();

    assert_eq!(attachment.title, "jail");
    assert_eq!(attachment.author_name.as_deref(), Some("c"));
    assert_eq!(
        attachment.author_link,
        Some(format!("{}/fbi/a/b/c", server.uri()))
    );
    assert_eq!(attachment.text.as_deref(), Some("Where the bad guys go"));
    assert_eq!(attachment.footer, "Project");
}

#[tokio::test]
async fn test_pipeline_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/kiwi%2Fcom/pipelines/2134"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 2134,
            "status": "running",
            "ref": "main",
            "sha": "abcdef",
            "started_at": "2017-04-29T08:46:00Z",
            "finished_at": null,
            "user": user("admin"),
            "created_at": "2017-04-29T08:45:00Z"
        })))
        .mount(&server)
        .await;

    let client = GitLabClient::new(&test_config(&server.uri())).unwrap();
    let info = PathInfo::new(PathType::Pipeline, "kiwi", "com").with_identifier("2134");
    let attachment = unfurl_path(&client, &info).await.unwrap();

    assert_eq!(attachment.title, "Pipeline #2134");
    assert_eq!(
        attachment.fields,
        vec![
            AttachmentField::short("Status", "running"),
            AttachmentField::short("Ref", "main"),
            AttachmentField::short(
                "Started at",
                "<!date^1493455560^{date_short_pretty} - {time_secs}|2017-04-29T08:46:00Z>",
            ),
        ]
    );
    assert_eq!(attachment.color.as_deref(), Some("#1aaa55"));
}

#[tokio::test]
async fn test_missing_identifier_is_rejected_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = GitLabClient::new(&test_config(&server.uri())).unwrap();
    let info = PathInfo::new(PathType::Commit, "kiwi", "com");
    let result = unfurl_path(&client, &info).await;

    assert!(matches!(result, Err(UnfurlError::ParseError(_))));
}

#[test]
fn test_invalid_gitlab_url_is_rejected() {
    let result = GitLabClient::new(&test_config("gitlab.example.com"));
    assert!(result.is_err());
}

#[test]
fn test_missing_ca_certificate_is_a_config_error() {
    let mut config = test_config("https://gitlab.example.com");
    config.gitlab_ca_cert = Some("/nonexistent/ca.pem".to_string());

    let result = GitLabClient::new(&config);
    assert!(matches!(result, Err(UnfurlError::ConfigError(_))));
}
