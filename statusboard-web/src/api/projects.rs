//! Project listing endpoints
//!
//! Listings run the store's active filters over the current snapshot.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use statusboard_common::filters::apply_filters;
use statusboard_common::model::{ActivityThreshold, FilterState, Project};
use statusboard_common::views::available_topics;
use std::collections::BTreeSet;

use super::error::ApiError;
use crate::pagination::{calculate_pagination, PAGE_SIZE};
use crate::AppState;

/// Query parameters for the project listing
#[derive(Debug, Deserialize)]
pub struct ProjectsQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: usize,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Overrides the stored time threshold for this request only
    pub threshold: Option<String>,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    PAGE_SIZE
}

/// Filtered, paginated project listing
#[derive(Debug, Serialize)]
pub struct ProjectsResponse {
    pub total_results: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub filters: FilterState,
    pub projects: Vec<Project>,
}

/// GET /api/projects?page=N&page_size=M&threshold=T
///
/// Projects passing every active filter, in brigade order.
pub async fn get_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectsQuery>,
) -> Result<Json<ProjectsResponse>, ApiError> {
    let snapshot = state.store.snapshot().await;
    let mut filters = snapshot.filters.clone();

    if let Some(threshold) = query.threshold.as_deref() {
        filters.time_threshold = threshold.parse::<ActivityThreshold>()?;
    }

    let filtered = apply_filters(&snapshot.projects(), &filters);
    let p = calculate_pagination(filtered.len(), query.page, query.page_size);

    Ok(Json(ProjectsResponse {
        total_results: filtered.len(),
        page: p.page,
        page_size: p.page_size,
        total_pages: p.total_pages,
        filters,
        projects: p.apply(&filtered),
    }))
}

/// GET /api/projects/:slug
///
/// All projects whose slug matches. Slugs are not unique, so this is a list.
pub async fn get_projects_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let matches: Vec<Project> = state
        .store
        .projects()
        .await
        .into_iter()
        .filter(|p| p.slug == slug)
        .collect();

    if matches.is_empty() {
        return Err(ApiError::NotFound(format!("project '{}'", slug)));
    }

    Ok(Json(matches))
}

/// GET /api/available-topics
///
/// Topics of projects active within the current time threshold; what the
/// topic picker offers.
pub async fn get_available_topics(State(state): State<AppState>) -> Json<BTreeSet<String>> {
    let snapshot = state.store.snapshot().await;
    Json(available_topics(
        &snapshot.projects(),
        snapshot.filters.time_threshold,
    ))
}
