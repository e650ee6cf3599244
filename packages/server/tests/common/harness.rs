//! Test harness wiring the router to in-memory integrations.
//!
//! Every test gets fresh doubles, so call counts start at zero.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use server_core::kernel::{ServerDeps, TestDependencies};
use server_core::server::build_app;
use test_context::AsyncTestContext;
use tower::ServiceExt;

pub use server_core::kernel::test_dependencies::{TEST_FAN_OUT_TIMEOUT, TEST_REVIEW_TOKEN};

/// Request timeout of the harness router.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Test harness around the mock integrations.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let response = ctx.get("/health").await;
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    /// Doubles for asserting on side effects
    pub mocks: TestDependencies,
    /// Dependencies handed to activities
    pub deps: Arc<ServerDeps>,
    pub router: Router,
}

/// Decoded HTTP response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub raw: Vec<u8>,
    pub body: Value,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new()
    }

    async fn teardown(self) {
        // Doubles are dropped with the harness
    }
}

impl TestHarness {
    pub fn new() -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let mocks = TestDependencies::new();
        let deps = Arc::new(mocks.server_deps());
        let router = build_app(deps.clone(), REQUEST_TIMEOUT);
        Self {
            mocks,
            deps,
            router,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let raw = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read response body")
            .to_vec();
        let body = if raw.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&raw).expect("response body is JSON")
        };

        TestResponse {
            status,
            headers,
            raw,
            body,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::ORIGIN, "https://gallery.example");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).expect("build request")).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: &Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body), None).await
    }

    /// PUT /submissions/status with the given bearer token
    pub async fn put_status(&self, body: &Value, token: Option<&str>) -> TestResponse {
        self.request(Method::PUT, "/submissions/status", Some(body), token)
            .await
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
