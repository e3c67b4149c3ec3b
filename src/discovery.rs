//! Project discovery
//!
//! The API scopes most data under a project, and a token may see
//! projects it cannot actually read. Discovery lists every visible
//! project, probes each one, and keeps only the ids the token can
//! fetch. The accessible-id list drives slicing for all
//! project-scoped streams, and a completed discovery doubles as the
//! connection check.

use serde_json::Value;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::{HeaderPaginator, PaginationState, Paginator};
use crate::records::{RecordExtractor, RootArrayExtractor};

/// Discovers the projects a token can read
pub struct ProjectDiscovery<'a> {
    client: &'a HttpClient,
}

impl<'a> ProjectDiscovery<'a> {
    /// Create a discovery pass over the given client
    pub fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// List accessible project ids, in the order the API returns them
    ///
    /// A probe failure excludes that project and is logged; it never
    /// fails the pass. A failure listing projects does.
    pub async fn discover(&self) -> Result<Vec<u64>> {
        let visible = self.list_project_ids().await?;
        debug!(projects = visible.len(), "listed visible projects");

        let mut accessible = Vec::with_capacity(visible.len());
        for project_id in visible {
            match self.probe(project_id).await {
                Ok(()) => accessible.push(project_id),
                Err(err) => {
                    error!(project_id, error = %err, "Unable to fetch project info");
                }
            }
        }

        debug!(projects = accessible.len(), "discovery complete");
        Ok(accessible)
    }

    /// Page through the project listing and collect ids
    async fn list_project_ids(&self) -> Result<Vec<u64>> {
        let paginator = HeaderPaginator::new();
        let extractor = RootArrayExtractor::new();
        let mut pagination_state = PaginationState::new();
        let mut project_ids = Vec::new();

        loop {
            let mut request = RequestConfig::new();
            for (key, value) in paginator.initial_params(&pagination_state) {
                request = request.query(&key, &value);
            }

            let response = self.client.get_with_config("projects", request).await?;
            let headers = response.headers().clone();
            let body: Value = response.json().await?;

            let records = extractor.extract(&body)?;
            let record_count = records.len();

            for record in records {
                let id = record.get("id").and_then(Value::as_u64).ok_or_else(|| {
                    Error::decode("project record has no integer id field")
                })?;
                project_ids.push(id);
            }

            let next = paginator.process_response(&headers, record_count, &mut pagination_state)?;
            if next.is_done() {
                break;
            }
        }

        Ok(project_ids)
    }

    /// Fetch a single project to verify the token can read it
    async fn probe(&self, project_id: u64) -> Result<()> {
        let body: Value = self
            .client
            .get_json(&format!("projects/{project_id}"))
            .await?;

        match body.as_object() {
            Some(project) if !project.is_empty() => Ok(()),
            _ => Err(Error::decode(format!(
                "project {project_id} probe returned no data"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpClientConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> HttpClient {
        let config = HttpClientConfig::builder()
            .base_url(server.uri())
            .max_retries(0)
            .no_rate_limit()
            .build();
        HttpClient::with_config(config)
    }

    fn project_body(id: u64) -> Value {
        json!({"id": id, "kind": "project", "name": format!("Project {id}")})
    }

    #[tokio::test]
    async fn test_discover_returns_accessible_projects() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"id": 99}, {"id": 101}])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/projects/99"))
            .respond_with(ResponseTemplate::new(200).set_body_json(project_body(99)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/projects/101"))
            .respond_with(ResponseTemplate::new(200).set_body_json(project_body(101)))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let ids = ProjectDiscovery::new(&client).discover().await.unwrap();

        assert_eq!(ids, vec![99, 101]);
    }

    #[tokio::test]
    async fn test_discover_excludes_failing_probe() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"id": 1}, {"id": 2}, {"id": 3}])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/projects/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(project_body(1)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/projects/2"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": "unauthorized_operation",
                "kind": "error"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/projects/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(project_body(3)))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let ids = ProjectDiscovery::new(&client).discover().await.unwrap();

        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_discover_pages_through_listing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects"))
            .and(query_param_is_missing("offset"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"id": 1}, {"id": 2}]))
                    .insert_header("X-Tracker-Pagination-Total", "3")
                    .insert_header("X-Tracker-Pagination-Limit", "2")
                    .insert_header("X-Tracker-Pagination-Offset", "0")
                    .insert_header("X-Tracker-Pagination-Returned", "2"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/projects"))
            .and(query_param("offset", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"id": 3}]))
                    .insert_header("X-Tracker-Pagination-Total", "3")
                    .insert_header("X-Tracker-Pagination-Limit", "2")
                    .insert_header("X-Tracker-Pagination-Offset", "2")
                    .insert_header("X-Tracker-Pagination-Returned", "1"),
            )
            .mount(&server)
            .await;
        for id in 1..=3 {
            Mock::given(method("GET"))
                .and(path(format!("/projects/{id}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(project_body(id)))
                .mount(&server)
                .await;
        }

        let client = test_client(&server);
        let ids = ProjectDiscovery::new(&client).discover().await.unwrap();

        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_discover_empty_listing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let ids = ProjectDiscovery::new(&client).discover().await.unwrap();

        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_discover_propagates_listing_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let result = ProjectDiscovery::new(&client).discover().await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_probe_rejects_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 7}])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/projects/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let ids = ProjectDiscovery::new(&client).discover().await.unwrap();

        assert!(ids.is_empty());
    }
}
