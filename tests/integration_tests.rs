//! Integration tests using a mock HTTP server
//!
//! Tests the full end-to-end flow: config → discovery → paginated stream
//! reads → emitted records and state.

use futures::StreamExt;
use serde_json::{json, Value};
use tracker_source::config::SourceConfig;
use tracker_source::source::{Message, Source, TrackerSource};
use tracker_source::state::State;
use tracker_source::streams::ConfiguredCatalog;
use tracker_source::types::{JsonObject, LogLevel};
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_TOKEN: &str = "test-token";

fn test_config(server: &MockServer) -> SourceConfig {
    SourceConfig::from_value(&json!({
        "api_token": TEST_TOKEN,
        "base_url": server.uri(),
    }))
    .unwrap()
}

async fn mount_project_listing(server: &MockServer, ids: &[u64]) {
    let body: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(header("X-TrackerToken", TEST_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(server)
        .await;
}

async fn mount_project_probe(server: &MockServer, id: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/projects/{id}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": id, "name": "Project"})),
        )
        .mount(server)
        .await;
}

async fn collect(
    source: &TrackerSource,
    config: &SourceConfig,
    catalog: &ConfiguredCatalog,
    state: Option<&State>,
) -> Vec<Message> {
    let stream = source.read(config, catalog, state).await.unwrap();
    stream.map(|item| item.unwrap()).collect().await
}

fn records_for<'a>(messages: &'a [Message], name: &str) -> Vec<&'a Value> {
    messages
        .iter()
        .filter_map(|m| match m {
            Message::Record { stream, data, .. } if stream == name => Some(data),
            _ => None,
        })
        .collect()
}

fn last_state_for(messages: &[Message], name: &str) -> Option<Value> {
    messages.iter().rev().find_map(|m| match m {
        Message::State { stream, data } if stream == name => Some(data.clone()),
        _ => None,
    })
}

fn error_logs(messages: &[Message]) -> Vec<&str> {
    messages
        .iter()
        .filter_map(|m| match m {
            Message::Log {
                level: LogLevel::Error,
                message,
            } => Some(message.as_str()),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Check Integration Tests
// ============================================================================

#[tokio::test]
async fn test_check_succeeds_against_live_listing() {
    let server = MockServer::start().await;
    mount_project_listing(&server, &[42]).await;
    mount_project_probe(&server, 42).await;

    let result = TrackerSource::new()
        .check(&test_config(&server))
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.message.is_none());
}

#[tokio::test]
async fn test_check_fails_on_bad_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": "unauthorized_operation",
            "kind": "error"
        })))
        .mount(&server)
        .await;

    let result = TrackerSource::new()
        .check(&test_config(&server))
        .await
        .unwrap();

    assert!(!result.success);
}

// ============================================================================
// Read Integration Tests
// ============================================================================

#[tokio::test]
async fn test_read_pages_through_stories() {
    let server = MockServer::start().await;
    mount_project_listing(&server, &[7]).await;
    mount_project_probe(&server, 7).await;

    // Two pages of stories behind the pagination headers.
    Mock::given(method("GET"))
        .and(path("/projects/7/stories"))
        .and(query_param_is_missing("offset"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Tracker-Pagination-Total", "3")
                .insert_header("X-Tracker-Pagination-Limit", "2")
                .insert_header("X-Tracker-Pagination-Offset", "0")
                .insert_header("X-Tracker-Pagination-Returned", "2")
                .set_body_json(json!([
                    {"id": 1, "name": "First", "updated_at": "2024-04-01T00:00:00"},
                    {"id": 2, "name": "Second", "updated_at": "2024-04-02T00:00:00"}
                ])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/7/stories"))
        .and(query_param("offset", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Tracker-Pagination-Total", "3")
                .insert_header("X-Tracker-Pagination-Limit", "2")
                .insert_header("X-Tracker-Pagination-Offset", "2")
                .insert_header("X-Tracker-Pagination-Returned", "1")
                .set_body_json(json!([
                    {"id": 3, "name": "Third", "updated_at": "2024-04-03T00:00:00"}
                ])),
        )
        .mount(&server)
        .await;

    let source = TrackerSource::new();
    let catalog = ConfiguredCatalog::select(&["stories".to_string()]).unwrap();
    let messages = collect(&source, &test_config(&server), &catalog, None).await;

    let stories = records_for(&messages, "stories");
    let ids: Vec<i64> = stories.iter().filter_map(|r| r["id"].as_i64()).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    // Watermark lands on the newest record.
    assert_eq!(
        last_state_for(&messages, "stories"),
        Some(json!({"updated_at": "2024-04-03T00:00:00"}))
    );
    assert!(error_logs(&messages).is_empty());
}

#[tokio::test]
async fn test_read_resumes_from_prior_state() {
    let server = MockServer::start().await;
    mount_project_listing(&server, &[7]).await;
    mount_project_probe(&server, 7).await;

    // Only records after the saved watermark come back.
    Mock::given(method("GET"))
        .and(path("/projects/7/stories"))
        .and(query_param("updated_after", "2024-04-02T00:00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 9, "name": "Newest", "updated_at": "2024-04-05T12:00:00"}
        ])))
        .mount(&server)
        .await;

    let mut saved = State::new();
    let mut stream_state = JsonObject::new();
    stream_state.insert("updated_at".to_string(), json!("2024-04-02T00:00:00"));
    saved.set_stream("stories", stream_state);

    let source = TrackerSource::new();
    let catalog = ConfiguredCatalog::select(&["stories".to_string()]).unwrap();
    let messages = collect(&source, &test_config(&server), &catalog, Some(&saved)).await;

    let ids: Vec<i64> = records_for(&messages, "stories")
        .iter()
        .filter_map(|r| r["id"].as_i64())
        .collect();
    assert_eq!(ids, vec![9]);
    assert_eq!(
        last_state_for(&messages, "stories"),
        Some(json!({"updated_at": "2024-04-05T12:00:00"}))
    );
}

#[tokio::test]
async fn test_read_skips_inaccessible_project() {
    let server = MockServer::start().await;
    mount_project_listing(&server, &[1, 2]).await;
    mount_project_probe(&server, 1).await;

    // Project 2 is listed but rejects the probe.
    Mock::given(method("GET"))
        .and(path("/projects/2"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": "unauthorized_operation",
            "kind": "error"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects/1/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 5, "name": "mvp"}])))
        .mount(&server)
        .await;

    let source = TrackerSource::new();
    let catalog = ConfiguredCatalog::select(&["labels".to_string()]).unwrap();
    let messages = collect(&source, &test_config(&server), &catalog, None).await;

    // Only the accessible project was sliced; no stream errors surfaced.
    let ids: Vec<i64> = records_for(&messages, "labels")
        .iter()
        .filter_map(|r| r["id"].as_i64())
        .collect();
    assert_eq!(ids, vec![5]);
    assert!(error_logs(&messages).is_empty());
}

#[tokio::test]
async fn test_read_with_no_accessible_projects() {
    let server = MockServer::start().await;
    mount_project_listing(&server, &[]).await;

    let source = TrackerSource::new();
    let catalog =
        ConfiguredCatalog::select(&["projects".to_string(), "stories".to_string()]).unwrap();
    let messages = collect(&source, &test_config(&server), &catalog, None).await;

    // The top-level projects stream still ran; project-scoped streams
    // produced zero slices. Neither is an error.
    assert!(records_for(&messages, "projects").is_empty());
    assert!(records_for(&messages, "stories").is_empty());
    assert!(error_logs(&messages).is_empty());
}

#[tokio::test]
async fn test_read_surfaces_stream_failure_and_continues() {
    let server = MockServer::start().await;
    mount_project_listing(&server, &[3]).await;
    mount_project_probe(&server, 3).await;

    Mock::given(method("GET"))
        .and(path("/projects/3/epics"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/3/releases"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 11, "name": "v1.0"}])),
        )
        .mount(&server)
        .await;

    let source = TrackerSource::new();
    let catalog =
        ConfiguredCatalog::select(&["epics".to_string(), "releases".to_string()]).unwrap();
    let messages = collect(&source, &test_config(&server), &catalog, None).await;

    let errors = error_logs(&messages);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("epics"));

    let ids: Vec<i64> = records_for(&messages, "releases")
        .iter()
        .filter_map(|r| r["id"].as_i64())
        .collect();
    assert_eq!(ids, vec![11]);
}

#[tokio::test]
async fn test_read_activity_lifts_project_id() {
    let server = MockServer::start().await;
    mount_project_listing(&server, &[8]).await;
    mount_project_probe(&server, 8).await;

    Mock::given(method("GET"))
        .and(path("/projects/8/activity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "guid": "8_1",
                "occurred_at": "2024-02-20T09:30:00",
                "project": {"id": 8, "name": "Alpha"},
                "highlight": "started"
            },
            {
                "guid": "8_2",
                "occurred_at": "2024-02-21T10:00:00",
                "highlight": "accepted"
            }
        ])))
        .mount(&server)
        .await;

    let source = TrackerSource::new();
    let catalog = ConfiguredCatalog::select(&["activity".to_string()]).unwrap();
    let messages = collect(&source, &test_config(&server), &catalog, None).await;

    let activity = records_for(&messages, "activity");
    assert_eq!(activity.len(), 2);
    assert_eq!(activity[0]["project_id"], json!(8));
    // Records without a project block pass through untouched.
    assert!(activity[1].get("project_id").is_none());

    assert_eq!(
        last_state_for(&messages, "activity"),
        Some(json!({"occurred_at": "2024-02-21T10:00:00"}))
    );
}

#[tokio::test]
async fn test_read_multiple_projects_share_one_watermark() {
    let server = MockServer::start().await;
    mount_project_listing(&server, &[1, 2]).await;
    mount_project_probe(&server, 1).await;
    mount_project_probe(&server, 2).await;

    Mock::given(method("GET"))
        .and(path("/projects/1/stories"))
        .and(query_param("updated_after", "1970-01-01T00:00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "updated_at": "2024-07-01T00:00:00"}
        ])))
        .mount(&server)
        .await;
    // The second slice filters from the watermark the first advanced.
    Mock::given(method("GET"))
        .and(path("/projects/2/stories"))
        .and(query_param("updated_after", "2024-07-01T00:00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 2, "updated_at": "2024-07-02T00:00:00"}
        ])))
        .mount(&server)
        .await;

    let source = TrackerSource::new();
    let catalog = ConfiguredCatalog::select(&["stories".to_string()]).unwrap();
    let messages = collect(&source, &test_config(&server), &catalog, None).await;

    let ids: Vec<i64> = records_for(&messages, "stories")
        .iter()
        .filter_map(|r| r["id"].as_i64())
        .collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(
        last_state_for(&messages, "stories"),
        Some(json!({"updated_at": "2024-07-02T00:00:00"}))
    );
}

// ============================================================================
// Discover Integration Tests
// ============================================================================

#[tokio::test]
async fn test_discover_returns_full_catalog() {
    let server = MockServer::start().await;

    let catalog = TrackerSource::new()
        .discover(&test_config(&server))
        .await
        .unwrap();

    assert_eq!(catalog.streams.len(), 7);

    let stories = catalog
        .streams
        .iter()
        .find(|s| s.name == "stories")
        .unwrap();
    assert_eq!(
        stories.default_cursor_field,
        Some(vec!["updated_at".to_string()])
    );
    assert_eq!(
        stories.source_defined_primary_key,
        Some(vec![vec!["id".to_string()]])
    );

    let activity = catalog
        .streams
        .iter()
        .find(|s| s.name == "activity")
        .unwrap();
    assert_eq!(
        activity.source_defined_primary_key,
        Some(vec![vec!["guid".to_string()]])
    );
}
