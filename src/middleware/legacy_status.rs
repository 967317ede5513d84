//! Legacy failure status
//!
//! Older clients of the generators API expect every failure to arrive with
//! status 404 and inspect the JSON payload for the actual cause. When
//! `api.legacy_error_status` is on, error responses are rewritten to 404;
//! the payload is left untouched.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::AppState;

/// Status a failure is reported with
pub fn legacy_status(status: StatusCode, enabled: bool) -> StatusCode {
    if enabled && (status.is_client_error() || status.is_server_error()) {
        StatusCode::NOT_FOUND
    } else {
        status
    }
}

pub async fn legacy_status_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let status = legacy_status(response.status(), state.config.api.legacy_error_status);
    if status != response.status() {
        tracing::debug!(
            original = response.status().as_u16(),
            "Reporting failure with legacy status 404"
        );
        *response.status_mut() = status;
    }
    response
}
