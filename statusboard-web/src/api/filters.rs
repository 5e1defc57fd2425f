//! Filter state endpoints

use axum::{extract::State, Json};
use statusboard_common::model::{FilterState, FilterUpdate};

use crate::AppState;

/// GET /api/filters
pub async fn get_filters(State(state): State<AppState>) -> Json<FilterState> {
    Json(state.store.filters().await)
}

/// PATCH /api/filters
///
/// Merges the keys present in the body; absent keys keep their value.
/// Returns the resulting filter state.
pub async fn patch_filters(
    State(state): State<AppState>,
    Json(update): Json<FilterUpdate>,
) -> Json<FilterState> {
    Json(state.store.set_filters(update).await)
}
