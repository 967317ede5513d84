//! API integration tests
//!
//! Health probes and routing behavior shared by every endpoint.

use crate::common::{TestApp, GENERATORS_URI};

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = TestApp::new().await;
    let response = app.get("/health").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_detailed_health_endpoint() {
    let app = TestApp::new().await;
    let response = app.get("/health/detailed").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["components"]["database"]["status"], "healthy");
    assert_eq!(
        json["enabled_routes"],
        serde_json::json!(["006", "007", "008", "009"])
    );
}

#[tokio::test]
async fn test_detailed_health_lists_only_enabled_routes() {
    let app = TestApp::with_disabled_routes(&["007", "009"]).await;
    let json: serde_json::Value = app.get("/health/detailed").await.json();

    assert_eq!(json["enabled_routes"], serde_json::json!(["006", "008"]));
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new().await;
    app.get("/health/live").await.assert_ok();
}

#[tokio::test]
async fn test_readiness_probe() {
    let app = TestApp::new().await;
    app.get("/health/ready").await.assert_ok();
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = TestApp::new().await;
    app.get("/v1/nonexistent").await.assert_not_found();
}

#[tokio::test]
async fn test_unsupported_method_is_reported_as_404_in_legacy_mode() {
    let app = TestApp::new().await;
    let response = app
        .request(
            axum::http::Request::builder()
                .method("DELETE")
                .uri(GENERATORS_URI)
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;

    response.assert_not_found();
}
