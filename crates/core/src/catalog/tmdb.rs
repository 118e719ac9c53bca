//! TMDB (The Movie Database) API client.
//!
//! Uses v4-style bearer authentication. Only the two listing endpoints the
//! search lifecycle needs are wired up.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{CatalogRequest, ListingPayload, MovieListing};
use super::{CatalogError, MovieCatalog};
use crate::metrics::{CATALOG_REQUESTS, CATALOG_REQUEST_DURATION};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// TMDB API client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB API read access token (required).
    #[serde(default)]
    pub api_key: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Image base URL for posters (default: https://image.tmdb.org/t/p/w500).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
    /// Request timeout. The HTTP client default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl TmdbConfig {
    pub fn image_base_url(&self) -> &str {
        self.image_base_url.as_deref().unwrap_or(DEFAULT_IMAGE_BASE_URL)
    }
}

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Result<Self, CatalogError> {
        if config.api_key.trim().is_empty() {
            return Err(CatalogError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
        })
    }

    /// Full URL for a request, with the search term percent-encoded.
    pub fn endpoint_url(&self, request: &CatalogRequest) -> String {
        match request {
            CatalogRequest::Discover => {
                format!("{}/discover/movie?sort_by=popularity.desc", self.base_url)
            }
            CatalogRequest::Search { query } => format!(
                "{}/search/movie?query={}",
                self.base_url,
                urlencoding::encode(query)
            ),
        }
    }

    async fn send(&self, request: &CatalogRequest) -> Result<MovieListing, CatalogError> {
        let url = self.endpoint_url(request);

        debug!("TMDB {} request: {}", request.endpoint(), url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ListingPayload = response.json().await.map_err(|e| {
            CatalogError::Parse(format!("Failed to parse movie listing: {}", e))
        })?;

        Ok(payload.into())
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn fetch(&self, request: &CatalogRequest) -> Result<MovieListing, CatalogError> {
        let endpoint = request.endpoint();
        let started = Instant::now();

        let result = self.send(request).await;

        CATALOG_REQUEST_DURATION
            .with_label_values(&[endpoint])
            .observe(started.elapsed().as_secs_f64());
        let label = match &result {
            Ok(MovieListing::Results(_)) => "ok",
            Ok(MovieListing::Rejected { .. }) => "rejected",
            Err(_) => "error",
        };
        CATALOG_REQUESTS.with_label_values(&[endpoint, label]).inc();

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::{RawQuery, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;

    /// What the fake TMDB saw for the last request.
    #[derive(Debug, Default, Clone)]
    struct Seen {
        path: String,
        query: Option<String>,
        authorization: Option<String>,
        accept: Option<String>,
    }

    type Shared = Arc<Mutex<Seen>>;

    fn record(seen: &Shared, path: &str, query: Option<String>, headers: &HeaderMap) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        *seen.lock().unwrap() = Seen {
            path: path.to_string(),
            query,
            authorization: header("authorization"),
            accept: header("accept"),
        };
    }

    async fn spawn_fake_tmdb() -> (SocketAddr, Shared) {
        let seen: Shared = Arc::default();

        let app = Router::new()
            .route(
                "/3/discover/movie",
                get(
                    |State(seen): State<Shared>, RawQuery(q): RawQuery, headers: HeaderMap| async move {
                        record(&seen, "/3/discover/movie", q, &headers);
                        r#"{"page":1,"results":[{"id":1,"title":"Popular"}]}"#
                    },
                ),
            )
            .route(
                "/3/search/movie",
                get(
                    |State(seen): State<Shared>, RawQuery(q): RawQuery, headers: HeaderMap| async move {
                        record(&seen, "/3/search/movie", q.clone(), &headers);
                        let (status, body) = match q.as_deref() {
                            Some("query=boom") => {
                                (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
                            }
                            Some("query=rejected") => (
                                StatusCode::OK,
                                r#"{"Response":"error","error":"Too many results."}"#,
                            ),
                            Some("query=garbage") => (StatusCode::OK, "not json"),
                            _ => (
                                StatusCode::OK,
                                r#"{"results":[{"id":268,"title":"Batman"},{"id":272,"title":"Batman Begins"}]}"#,
                            ),
                        };
                        (status, body.to_string())
                    },
                ),
            )
            .with_state(Arc::clone(&seen));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (addr, seen)
    }

    fn client_for(addr: SocketAddr) -> TmdbClient {
        TmdbClient::new(TmdbConfig {
            api_key: "test-token".to_string(),
            base_url: Some(format!("http://{}/3", addr)),
            image_base_url: None,
            timeout_secs: Some(5),
        })
        .unwrap()
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = TmdbClient::new(TmdbConfig::default());
        assert!(matches!(result, Err(CatalogError::NotConfigured(_))));
    }

    #[test]
    fn test_endpoint_urls() {
        let client = TmdbClient::new(TmdbConfig {
            api_key: "k".to_string(),
            ..TmdbConfig::default()
        })
        .unwrap();

        assert_eq!(
            client.endpoint_url(&CatalogRequest::Discover),
            "https://api.themoviedb.org/3/discover/movie?sort_by=popularity.desc"
        );
        assert_eq!(
            client.endpoint_url(&CatalogRequest::for_term("the dark knight & co")),
            "https://api.themoviedb.org/3/search/movie?query=the%20dark%20knight%20%26%20co"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = TmdbClient::new(TmdbConfig {
            api_key: "k".to_string(),
            base_url: Some("http://localhost:9000/3/".to_string()),
            ..TmdbConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.endpoint_url(&CatalogRequest::Discover),
            "http://localhost:9000/3/discover/movie?sort_by=popularity.desc"
        );
    }

    #[test]
    fn test_image_base_url_default() {
        assert_eq!(TmdbConfig::default().image_base_url(), DEFAULT_IMAGE_BASE_URL);
    }

    #[tokio::test]
    async fn test_discover_sends_auth_headers() {
        let (addr, seen) = spawn_fake_tmdb().await;
        let client = client_for(addr);

        let listing = client.fetch(&CatalogRequest::Discover).await.unwrap();
        match listing {
            MovieListing::Results(movies) => assert_eq!(movies[0].title, "Popular"),
            other => panic!("unexpected listing: {:?}", other),
        }

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.path, "/3/discover/movie");
        assert_eq!(seen.query.as_deref(), Some("sort_by=popularity.desc"));
        assert_eq!(seen.authorization.as_deref(), Some("Bearer test-token"));
        assert_eq!(seen.accept.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_search_returns_results() {
        let (addr, seen) = spawn_fake_tmdb().await;
        let client = client_for(addr);

        let listing = client
            .fetch(&CatalogRequest::for_term("batman"))
            .await
            .unwrap();
        match listing {
            MovieListing::Results(movies) => {
                assert_eq!(movies.len(), 2);
                assert_eq!(movies[0].id, 268);
            }
            other => panic!("unexpected listing: {:?}", other),
        }
        assert_eq!(seen.lock().unwrap().query.as_deref(), Some("query=batman"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let (addr, _) = spawn_fake_tmdb().await;
        let client = client_for(addr);

        let err = client
            .fetch(&CatalogRequest::for_term("boom"))
            .await
            .unwrap_err();
        match err {
            CatalogError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_payload_is_rejected_listing() {
        let (addr, _) = spawn_fake_tmdb().await;
        let client = client_for(addr);

        let listing = client
            .fetch(&CatalogRequest::for_term("rejected"))
            .await
            .unwrap();
        assert_eq!(
            listing,
            MovieListing::Rejected {
                message: Some("Too many results.".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_undecodable_body_is_parse_error() {
        let (addr, _) = spawn_fake_tmdb().await;
        let client = client_for(addr);

        let err = client
            .fetch(&CatalogRequest::for_term("garbage"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        // Bind and drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(addr);
        let err = client.fetch(&CatalogRequest::Discover).await.unwrap_err();
        assert!(matches!(err, CatalogError::Http(_)));
    }
}
