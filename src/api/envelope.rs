//! Versioned success envelope
//!
//! Successful responses carry `{"success": true, "data": ..., "message": null}`
//! and name the route they came from in the `x-api-route` header.

use axum::{
    http::HeaderName,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::ApiRoute;

pub const API_VERSION: &str = "v1";
pub const API_ROUTE_HEADER: HeaderName = HeaderName::from_static("x-api-route");

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: Option<String>,
}

/// A success payload tagged with its route
#[derive(Debug)]
pub struct Envelope<T> {
    route: ApiRoute,
    body: ApiResponse<T>,
}

/// Wrap `data` for `route` and record the response
pub fn respond<T>(route: ApiRoute, data: T) -> Envelope<T> {
    tracing::info!(
        api_version = API_VERSION,
        route = route.path(),
        route_code = route.code(),
        "REST response"
    );
    Envelope {
        route,
        body: ApiResponse {
            success: true,
            data,
            message: None,
        },
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        ([(API_ROUTE_HEADER, self.route.path())], Json(self.body)).into_response()
    }
}
