//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with mock dependencies injected, so the HTTP surface can be exercised
//! without TMDB.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use marquee_core::{
    create_report_system, testing::{MockMovieCatalog, MockTrendingStore}, Config, MovieCatalog,
    SearchReporter, SqliteTrendingStore, TmdbConfig, TrendingStore,
};

/// Re-export fixtures for test convenience
pub use marquee_core::testing::fixtures;

/// Image base used by every fixture.
pub const IMAGE_BASE_URL: &str = "https://images.test/w500";

/// Which trending store backs the fixture.
#[derive(Debug, Clone, Copy, Default)]
pub enum StoreKind {
    /// `MockTrendingStore`, with failure injection.
    #[default]
    Mock,
    /// Real `SqliteTrendingStore` in a temp directory.
    Sqlite,
}

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new();
///     fixture.catalog.set_results("heat", vec![fixtures::movie(949, "Heat")]);
///
///     let response = fixture.get("/api/v1/movies?query=heat").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog - configure TMDB responses
    pub catalog: Arc<MockMovieCatalog>,
    /// Mock trending store (unused when backed by SQLite)
    pub mock_store: Arc<MockTrendingStore>,
    /// Trending store the router actually uses
    pub store: Arc<dyn TrendingStore>,
    /// Background report writer
    pub writer: Option<JoinHandle<()>>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture backed by the mock trending store.
    pub fn new() -> Self {
        Self::with_store(StoreKind::Mock)
    }

    /// Create a test fixture with the given trending store.
    pub fn with_store(kind: StoreKind) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let catalog = Arc::new(MockMovieCatalog::new());
        let mock_store = Arc::new(MockTrendingStore::new());
        let store: Arc<dyn TrendingStore> = match kind {
            StoreKind::Mock => mock_store.clone() as Arc<dyn TrendingStore>,
            StoreKind::Sqlite => Arc::new(
                SqliteTrendingStore::new(&db_path).expect("Failed to create trending store"),
            ),
        };

        let mut config = Config {
            tmdb: TmdbConfig {
                api_key: "test-key".to_string(),
                image_base_url: Some(IMAGE_BASE_URL.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        config.database.path = db_path;

        let (reporter, writer) = create_report_system(Arc::clone(&store), IMAGE_BASE_URL, 64);
        let writer = tokio::spawn(writer.run());

        let router = build_router(config, catalog.clone(), Arc::clone(&store), Some(reporter));

        Self {
            router,
            catalog,
            mock_store,
            store,
            writer: Some(writer),
            temp_dir,
        }
    }

    /// Drop the router and wait for queued reports to be written.
    pub async fn drain_reports(&mut self) {
        self.router = Router::new();
        if let Some(writer) = self.writer.take() {
            tokio::time::timeout(Duration::from_secs(5), writer)
                .await
                .expect("Report writer did not stop")
                .expect("Report writer panicked");
        }
    }

    /// Send a GET request to the test router.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

fn build_router(
    config: Config,
    catalog: Arc<dyn MovieCatalog>,
    store: Arc<dyn TrendingStore>,
    reporter: Option<SearchReporter>,
) -> Router {
    let state = Arc::new(marquee_server::state::AppState::new(
        config, catalog, store, reporter,
    ));
    marquee_server::api::create_router(state)
}
