//! Shared fixtures: a service wired to an in-memory SQLite store and a
//! throwaway media directory, and an HTTP harness around the full router.

use std::sync::Arc;

use domains::ports::Store;
use domains::User;
use services::MicroblogService;
use storage_adapters::{LocalMediaStore, SqliteStore};
use tempfile::TempDir;

pub const IMAGE_PREFIX: &str = "/api/app/images";

/// A fully wired service over real adapters.
pub struct TestContext {
    pub service: MicroblogService,
    pub store: Arc<SqliteStore>,
    _media_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let media_dir = tempfile::tempdir().unwrap();
        let media = LocalMediaStore::new(media_dir.path().to_path_buf(), IMAGE_PREFIX)
            .await
            .unwrap();
        let service = MicroblogService::new(store.clone() as Arc<dyn Store>, Arc::new(media));
        Self {
            service,
            store,
            _media_dir: media_dir,
        }
    }

    /// Inserts a user with a fixed name, bypassing the random name pool.
    pub async fn seed_user(&self, name: &str, api_key: &str) -> User {
        let mut tx = self.store.begin_write().await.unwrap();
        let user = tx.insert_user(name, api_key).await.unwrap();
        tx.commit().await.unwrap();
        user
    }
}

#[cfg(feature = "web-axum")]
pub use http::{TestApp, MAX_UPLOAD_BYTES};

#[cfg(feature = "web-axum")]
mod http {
    use std::ops::Deref;

    use api_adapters::handlers::AppState;
    use api_adapters::{build_router, RouterOptions};
    use axum::body::Body;
    use axum::http::{HeaderMap, Method, Request, StatusCode};
    use axum::Router;
    use bytes::Bytes;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::TestContext;

    pub const MAX_UPLOAD_BYTES: usize = 64 * 1024;
    const BOUNDARY: &str = "microblog-test-boundary";

    /// The router over a [`TestContext`], driven with `oneshot`.
    pub struct TestApp {
        ctx: TestContext,
        router: Router,
    }

    impl Deref for TestApp {
        type Target = TestContext;

        fn deref(&self) -> &TestContext {
            &self.ctx
        }
    }

    impl TestApp {
        pub async fn new() -> Self {
            let ctx = TestContext::new().await;
            let router = build_router(
                AppState {
                    service: ctx.service.clone(),
                },
                &RouterOptions {
                    static_dir: None,
                    max_upload_bytes: MAX_UPLOAD_BYTES,
                    cors_allow_any_origin: true,
                },
            );
            Self { ctx, router }
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, headers, body)
        }

        /// Sends a JSON request and parses the JSON reply (`Null` if empty).
        pub async fn call(
            &self,
            method: Method,
            uri: &str,
            api_key: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(key) = api_key {
                builder = builder.header("api-key", key);
            }
            let request = match body {
                Some(json) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(json.to_string())),
                None => builder.body(Body::empty()),
            }
            .unwrap();

            let (status, _, body) = self.send(request).await;
            (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
        }

        pub async fn get(&self, uri: &str, api_key: Option<&str>) -> (StatusCode, Value) {
            self.call(Method::GET, uri, api_key, None).await
        }

        pub async fn post(
            &self,
            uri: &str,
            api_key: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            self.call(Method::POST, uri, api_key, body).await
        }

        pub async fn delete(&self, uri: &str, api_key: Option<&str>) -> (StatusCode, Value) {
            self.call(Method::DELETE, uri, api_key, None).await
        }

        /// Uploads `data` as the multipart field `field`.
        pub async fn upload(
            &self,
            api_key: Option<&str>,
            field: &str,
            filename: &str,
            data: &[u8],
        ) -> (StatusCode, Value) {
            let mut body = Vec::new();
            let part_header = format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            );
            body.extend_from_slice(part_header.as_bytes());
            body.extend_from_slice(data);
            body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

            let mut builder = Request::builder()
                .method(Method::POST)
                .uri("/api/medias")
                .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"));
            if let Some(key) = api_key {
                builder = builder.header("api-key", key);
            }

            let (status, _, body) = self.send(builder.body(Body::from(body)).unwrap()).await;
            (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
        }

        /// Fetches a path and returns the raw bytes.
        pub async fn get_raw(&self, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            self.send(request).await
        }
    }
}
