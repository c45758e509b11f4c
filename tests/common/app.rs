//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use reduction_print::models::AppConfig;
use reduction_print::server::{build_router, create_app_state};
use reduction_print::services::ProjectService;

const BOUNDARY: &str = "reduction-print-test-boundary";

/// Test application with router and direct access to services
pub struct TestApp {
    router: axum::Router,
    pub service: Arc<ProjectService>,
    // Removed with the app
    projects_dir: TempDir,
}

impl TestApp {
    /// Create a new test application backed by a temporary projects directory
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test application after adjusting the default configuration
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let projects_dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = AppConfig {
            projects_dir: projects_dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        adjust(&mut config);

        // Create application state using shared server module
        let state = create_app_state(config).expect("Failed to create app state");
        let service = state.service.clone();

        // Build router using shared server module (same as production)
        let router = build_router(state);

        Self {
            router,
            service,
            projects_dir,
        }
    }

    pub fn projects_dir(&self) -> &std::path::Path {
        self.projects_dir.path()
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a DELETE request to the given path
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(Request::delete(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with an empty body
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request(Request::post(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, body: serde_json::Value) -> TestResponse {
        let request = Request::post(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(request).await
    }

    /// Make a PUT request with JSON body
    pub async fn put_json(&self, path: &str, body: serde_json::Value) -> TestResponse {
        let request = Request::put(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(request).await
    }

    /// Upload an image as multipart form data
    pub async fn upload(&self, name: Option<&str>, file_name: &str, image: &[u8]) -> TestResponse {
        let mut body = Vec::new();
        if let Some(name) = name {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(image);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::post("/api/projects")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.request(request).await
    }

    /// Upload an image and return the new project's id
    pub async fn create_project(&self, name: &str, image: &[u8]) -> String {
        let response = self.upload(Some(name), "upload.png", image).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "upload failed: {}",
            response.text()
        );
        let json: serde_json::Value = response.json();
        json["id"].as_str().unwrap().to_string()
    }

    /// Create a project and quantize it
    pub async fn quantized_project(&self, image: &[u8], color_count: usize) -> String {
        let id = self.create_project("fixture", image).await;
        let response = self
            .post_json(
                &format!("/api/projects/{id}/quantize"),
                serde_json::json!({ "color_count": color_count }),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "quantize failed: {}",
            response.text()
        );
        id
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Check if response is a PNG image
    pub fn is_png(&self) -> bool {
        self.body.len() >= 8 && self.body[0..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]
    }

    /// Header value as string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
