//! API routes and handlers
//!
//! This module defines all API endpoints and their routing.

use axum::{routing::get, Router};

use crate::AppState;

pub mod envelope;
mod generators;
mod health;

pub use envelope::{ApiResponse, Envelope, API_ROUTE_HEADER, API_VERSION};
pub use health::*;

/// Public routes (health probes)
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/detailed", get(health::health_check_detailed))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
}

/// Versioned resource routes
pub fn resource_routes() -> Router<AppState> {
    Router::new().nest(&format!("/{}/generators", API_VERSION), generators::routes())
}

/// Create the full API router (useful for tests)
pub fn routes() -> Router<AppState> {
    public_routes().merge(resource_routes())
}
