//! License Manager library
//!
//! Core of the license manager service: the generator model and repository,
//! the route gate and the versioned REST API on top of them.

use std::sync::Arc;

use axum::Router;

pub mod api;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;
pub use middleware::Actor;
use db::SettingsRepository;
use services::RouteGate;
use utils::AppError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
    /// Route flags, fixed when the router is built
    pub route_gate: Arc<RouteGate>,
}

impl AppState {
    /// Seed the configured route defaults and load the route gate
    pub async fn build(config: AppConfig, db: DbPool) -> Result<Self, AppError> {
        let settings = SettingsRepository::new(db.clone());
        let seeded = settings.seed_route_flags(&config.api.routes).await?;
        if seeded > 0 {
            tracing::info!(seeded, "Seeded default route flags");
        }

        let route_gate = Arc::new(RouteGate::load(&settings).await?);

        Ok(Self {
            config,
            db,
            route_gate,
        })
    }
}

/// API router with the application middleware, without transport layers
pub fn app_router(state: AppState) -> Router {
    let resources = api::resource_routes()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::legacy_status_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::actor_middleware,
        ));

    Router::new()
        .merge(api::public_routes())
        .merge(resources)
        .with_state(state)
}
