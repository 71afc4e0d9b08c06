//! Prismic REST API client

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::error::CmsError;
use super::response::handle_response;
use super::retry::RetryPolicy;
use super::types::{ApiPage, Cursor};
use super::{ContentApi, ContentRef, Query};
use crate::config::CmsConfig;

/// How long a resolved master ref is reused
const MASTER_REF_TTL: Duration = Duration::from_secs(5);

/// API root, only the parts needed to find the master ref
#[derive(Debug, Deserialize)]
struct ApiRoot {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    value: String,
    #[serde(rename = "isMasterRef", default)]
    is_master: bool,
}

/// Content API client over HTTP
pub struct PrismicClient {
    endpoint: String,
    access_token: Option<String>,
    client: reqwest::Client,
    retry: RetryPolicy,
    master_ref: Mutex<Option<(String, Instant)>>,
}

impl PrismicClient {
    /// Create a client for the configured repository
    ///
    /// `endpoint` is the API root, e.g. `https://my-repo.cdn.prismic.io/api/v2`.
    pub fn new(config: &CmsConfig) -> Result<Self, CmsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .user_agent(concat!("prismic-blog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            client,
            retry: RetryPolicy {
                max_retries: config.max_retries,
                backoff: Duration::from_millis(config.retry_backoff_ms),
            },
            master_ref: Mutex::new(None),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ref to search against: the preview token, or the current master ref
    async fn resolve_ref(&self, content_ref: &ContentRef) -> Result<String, CmsError> {
        if let ContentRef::Preview(token) = content_ref {
            return Ok(token.clone());
        }

        if let Some(cached) = self.cached_master_ref() {
            return Ok(cached);
        }

        let root: ApiRoot = self
            .retry
            .run("api root", || async {
                let mut request = self.client.get(&self.endpoint);
                if let Some(token) = &self.access_token {
                    request = request.query(&[("access_token", token)]);
                }
                handle_response(request.send().await?).await
            })
            .await?;

        let master = root
            .refs
            .into_iter()
            .find(|r| r.is_master)
            .map(|r| r.value)
            .ok_or(CmsError::MissingMasterRef)?;

        if let Ok(mut guard) = self.master_ref.lock() {
            *guard = Some((master.clone(), Instant::now()));
        }
        Ok(master)
    }

    fn cached_master_ref(&self) -> Option<String> {
        let guard = self.master_ref.lock().ok()?;
        match guard.as_ref() {
            Some((value, at)) if at.elapsed() < MASTER_REF_TTL => Some(value.clone()),
            _ => None,
        }
    }

    /// Query string parameters of a search
    fn search_params(&self, query: &Query, content_ref: String) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("ref", content_ref),
            ("q", query.predicates_string()),
            ("pageSize", query.page_size.to_string()),
        ];
        if !query.fetch.is_empty() {
            params.push(("fetch", query.fetch.join(",")));
        }
        if let Some(orderings) = query.orderings_string() {
            params.push(("orderings", orderings));
        }
        if let Some(after) = &query.after {
            params.push(("after", after.clone()));
        }
        if let Some(token) = &self.access_token {
            params.push(("access_token", token.clone()));
        }
        params
    }
}

#[async_trait]
impl ContentApi for PrismicClient {
    #[tracing::instrument(skip_all, level = "debug", fields(q = %query.predicates_string()))]
    async fn query(&self, query: &Query) -> Result<ApiPage, CmsError> {
        let content_ref = self.resolve_ref(&query.content_ref).await?;
        let params = self.search_params(query, content_ref);
        let url = format!("{}/documents/search", self.endpoint);

        self.retry
            .run("search", || async {
                let response = self.client.get(&url).query(&params).send().await?;
                handle_response(response).await
            })
            .await
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%cursor))]
    async fn next_page(&self, cursor: &Cursor) -> Result<ApiPage, CmsError> {
        // The cursor is forwarded verbatim, but only to our own endpoint
        if !cursor.as_str().starts_with(&format!("{}/", self.endpoint)) {
            return Err(CmsError::InvalidCursor(cursor.to_string()));
        }

        self.retry
            .run("next page", || async {
                let response = self.client.get(cursor.as_str()).send().await?;
                handle_response(response).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::{OrderField, Ordering};

    fn client() -> PrismicClient {
        PrismicClient::new(&CmsConfig {
            endpoint: "https://blog.cdn.prismic.io/api/v2/".to_string(),
            access_token: Some("secret".to_string()),
            ..CmsConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_is_normalized() {
        assert_eq!(client().endpoint(), "https://blog.cdn.prismic.io/api/v2");
    }

    #[test]
    fn test_search_params() {
        let query = Query::by_type("posts")
            .fetch(["posts.title"])
            .page_size(1)
            .order_by(Ordering::desc(OrderField::LastPublicationDate))
            .after("YEx9");
        let params = client().search_params(&query, "master-ref".to_string());

        assert_eq!(
            params,
            vec![
                ("ref", "master-ref".to_string()),
                ("q", r#"[[at(document.type,"posts")]]"#.to_string()),
                ("pageSize", "1".to_string()),
                ("fetch", "posts.title".to_string()),
                (
                    "orderings",
                    "[document.last_publication_date desc]".to_string()
                ),
                ("after", "YEx9".to_string()),
                ("access_token", "secret".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_foreign_cursor_is_rejected() {
        let cursor = Cursor::new("http://169.254.169.254/latest/meta-data");
        let result = client().next_page(&cursor).await;
        assert!(matches!(result, Err(CmsError::InvalidCursor(_))));
    }

    #[tokio::test]
    async fn test_preview_ref_skips_api_root() {
        let resolved = client()
            .resolve_ref(&ContentRef::Preview("preview-token".into()))
            .await
            .unwrap();
        assert_eq!(resolved, "preview-token");
    }

    mod over_http {
        use super::*;
        use axum::extract::{Query as Params, State};
        use axum::http::StatusCode;
        use axum::response::{IntoResponse, Json, Response};
        use axum::routing::get;
        use axum::Router;
        use serde_json::json;
        use std::collections::HashMap;
        use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};
        use std::sync::Arc;

        /// A local CMS that counts hits and fails the first searches
        #[derive(Default)]
        struct MockCms {
            has_master: bool,
            failing_searches: usize,
            root_hits: AtomicUsize,
            search_hits: AtomicUsize,
        }

        async fn api_root(State(cms): State<Arc<MockCms>>) -> Json<serde_json::Value> {
            cms.root_hits.fetch_add(1, SeqCst);
            Json(json!({
                "refs": [
                    { "id": "release", "ref": "release-ref", "isMasterRef": false },
                    { "id": "master", "ref": "master-ref", "isMasterRef": cms.has_master }
                ]
            }))
        }

        async fn search(
            State(cms): State<Arc<MockCms>>,
            Params(params): Params<HashMap<String, String>>,
        ) -> Response {
            if cms.search_hits.fetch_add(1, SeqCst) < cms.failing_searches {
                return (StatusCode::SERVICE_UNAVAILABLE, "busy").into_response();
            }
            // Echo the ref back as the document id
            let content_ref = params.get("ref").cloned().unwrap_or_default();
            Json(json!({
                "next_page": null,
                "results": [{ "id": content_ref, "uid": "hello", "type": "posts" }]
            }))
            .into_response()
        }

        async fn start(cms: MockCms) -> (Arc<MockCms>, PrismicClient) {
            let cms = Arc::new(cms);
            let app = Router::new()
                .route("/api/v2", get(api_root))
                .route("/api/v2/documents/search", get(search))
                .with_state(cms.clone());

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            let client = PrismicClient::new(&CmsConfig {
                endpoint: format!("http://{}/api/v2", addr),
                access_token: None,
                max_retries: 1,
                retry_backoff_ms: 0,
                ..CmsConfig::default()
            })
            .unwrap();
            (cms, client)
        }

        #[tokio::test]
        async fn test_master_ref_is_fetched_once_and_reused() {
            let (cms, client) = start(MockCms {
                has_master: true,
                ..MockCms::default()
            })
            .await;

            for _ in 0..3 {
                let page = client.query(&Query::by_type("posts")).await.unwrap();
                assert_eq!(page.results[0].id, "master-ref");
            }
            assert_eq!(cms.root_hits.load(SeqCst), 1);
            assert_eq!(cms.search_hits.load(SeqCst), 3);
        }

        #[tokio::test]
        async fn test_search_retries_server_error_once() {
            let (cms, client) = start(MockCms {
                has_master: true,
                failing_searches: 1,
                ..MockCms::default()
            })
            .await;

            let page = client.query(&Query::by_type("posts")).await.unwrap();
            assert_eq!(page.results.len(), 1);
            assert_eq!(cms.search_hits.load(SeqCst), 2);
        }

        #[tokio::test]
        async fn test_search_gives_up_after_retry() {
            let (cms, client) = start(MockCms {
                has_master: true,
                failing_searches: 2,
                ..MockCms::default()
            })
            .await;

            let result = client.query(&Query::by_type("posts")).await;
            assert!(matches!(result, Err(CmsError::Status { status: 503, .. })));
            assert_eq!(cms.search_hits.load(SeqCst), 2);
        }

        #[tokio::test]
        async fn test_next_page_retries_server_error_once() {
            let (cms, client) = start(MockCms {
                failing_searches: 1,
                ..MockCms::default()
            })
            .await;

            let cursor = Cursor::new(format!("{}/documents/search?page=2", client.endpoint()));
            let page = client.next_page(&cursor).await.unwrap();
            assert_eq!(page.results.len(), 1);
            assert_eq!(cms.search_hits.load(SeqCst), 2);
            assert_eq!(cms.root_hits.load(SeqCst), 0);
        }

        #[tokio::test]
        async fn test_root_without_master_ref() {
            let (cms, client) = start(MockCms::default()).await;

            let result = client.query(&Query::by_type("posts")).await;
            assert!(matches!(result, Err(CmsError::MissingMasterRef)));
            assert_eq!(cms.search_hits.load(SeqCst), 0);
        }
    }
}
