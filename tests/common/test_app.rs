//! Test application setup utilities
//!
//! Provides utilities for setting up test instances of the application
//! backed by a throwaway SQLite file.

use axum::{
    body::Body,
    http::{HeaderName, Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use uuid::Uuid;

use license_manager::{
    app_router,
    config::{ApiConfig, AppConfig, DatabaseConfig, LoggingConfig, ServerConfig},
    db, AppState,
};

/// Test application wrapper for integration testing
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    actor: Option<i64>,
}

impl TestApp {
    /// Create a new test application with every route enabled
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application with the given routes switched off
    pub async fn with_disabled_routes(codes: &[&str]) -> Self {
        let mut config = test_config();
        for code in codes {
            config.api.routes.insert(code.to_string(), false);
        }
        Self::with_config(config).await
    }

    /// Create a test application reporting conventional failure statuses
    pub async fn with_conventional_status() -> Self {
        let mut config = test_config();
        config.api.legacy_error_status = false;
        Self::with_config(config).await
    }

    /// Create a new test application with custom configuration
    pub async fn with_config(config: AppConfig) -> Self {
        let db = db::init_pool(&config.database)
            .await
            .expect("Failed to initialize test database");

        let state = AppState::build(config, db)
            .await
            .expect("Failed to build application state");

        Self::from_state(state)
    }

    /// Wrap an already built application state
    pub fn from_state(state: AppState) -> Self {
        Self {
            router: app_router(state.clone()),
            state,
            actor: None,
        }
    }

    /// Send the actor header with every following request
    pub fn acting_as(mut self, actor: i64) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Make a GET request to the test application
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> TestResponse {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Make a POST request with a form-encoded body
    pub async fn post_form(&self, uri: &str, body: &str) -> TestResponse {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Make a PUT request with JSON body
    pub async fn put_json(&self, uri: &str, body: serde_json::Value) -> TestResponse {
        self.put_raw(uri, &body.to_string()).await
    }

    /// Make a PUT request with an arbitrary body
    pub async fn put_raw(&self, uri: &str, body: &str) -> TestResponse {
        self.request(
            Request::builder()
                .method("PUT")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Make an arbitrary request
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let (mut parts, body) = request.into_parts();
        if let Some(actor) = self.actor {
            let header =
                HeaderName::try_from(self.state.config.api.actor_header.as_str()).unwrap();
            parts.headers.insert(header, actor.to_string().parse().unwrap());
        }

        let response = self
            .router
            .clone()
            .oneshot(Request::from_parts(parts, body))
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: bytes::Bytes,
}

impl TestResponse {
    /// Get the response body as a string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Parse the response body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse response as JSON")
    }

    /// The `data` member of a success envelope
    pub fn data(&self) -> serde_json::Value {
        let json: serde_json::Value = self.json();
        assert_eq!(json["success"], true, "Not a success envelope: {}", self.text());
        json["data"].clone()
    }

    /// Assert the response status
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    /// Assert the response status is OK (200)
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// Assert the response status is Bad Request (400)
    pub fn assert_bad_request(&self) -> &Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    /// Assert the response status is Forbidden (403)
    pub fn assert_forbidden(&self) -> &Self {
        self.assert_status(StatusCode::FORBIDDEN)
    }

    /// Assert the response status is Not Found (404)
    pub fn assert_not_found(&self) -> &Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    /// Assert the uniform error payload
    pub fn assert_error(&self, kind: &str, message: &str) -> &Self {
        let json: serde_json::Value = self.json();
        assert_eq!(json["error"], kind, "Body: {}", self.text());
        assert_eq!(json["message"], message, "Body: {}", self.text());
        assert_eq!(json["code"], "rest_data_error");
        self
    }

    /// Assert the `x-api-route` header
    pub fn assert_route(&self, route: &str) -> &Self {
        assert_eq!(
            self.headers
                .get("x-api-route")
                .and_then(|v| v.to_str().ok()),
            Some(route)
        );
        self
    }
}

/// Create a test configuration with temporary SQLite database
pub fn test_config() -> AppConfig {
    // Use a unique temp file for each test to avoid conflicts
    let db_path = std::env::temp_dir().join(format!(
        "license_manager_test_{}.db",
        Uuid::new_v4().simple()
    ));

    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            tls: None,
        },
        database: DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", db_path.display()),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig::default(),
        api: ApiConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_app_creation() {
        let app = TestApp::new().await;
        assert!(app.state.config.api.legacy_error_status);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = TestApp::new().await;
        let response = app.get("/health").await;
        response.assert_ok();
    }
}
