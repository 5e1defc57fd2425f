//! statusboard-web library - brigade status dashboard service
//!
//! Serves the store's derived views and actions as JSON for the browser
//! front end.

use std::sync::Arc;

use axum::Router;
use statusboard_common::Store;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod pagination;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Canonical data, load status and filters
    pub store: Arc<Store>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/status", get(api::get_status))
        .route("/api/brigades", get(api::get_brigades))
        .route("/api/leaders", get(api::get_leaders))
        .route("/api/topics", get(api::get_topics))
        .route("/api/tags", get(api::get_tags))
        .route("/api/projects", get(api::get_projects))
        .route("/api/projects/:slug", get(api::get_projects_by_slug))
        .route("/api/available-topics", get(api::get_available_topics))
        .route("/api/filters", get(api::get_filters).patch(api::patch_filters))
        .route("/api/refresh", post(api::refresh))
        .route("/api/events", get(api::event_stream))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
