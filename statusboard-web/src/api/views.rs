//! Read-only views over the store

use axum::{extract::State, Json};
use statusboard_common::model::{Brigade, DiscourseTag};
use statusboard_common::StoreStatus;
use std::collections::{BTreeSet, HashMap};

use crate::AppState;

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StoreStatus> {
    Json(state.store.status().await)
}

/// GET /api/brigades
pub async fn get_brigades(State(state): State<AppState>) -> Json<Vec<Brigade>> {
    Json(state.store.brigades().await.to_vec())
}

/// GET /api/leaders
///
/// Top brigades by share of projects carrying topics.
pub async fn get_leaders(State(state): State<AppState>) -> Json<Vec<Brigade>> {
    Json(state.store.leaders().await)
}

/// GET /api/topics
///
/// Every topic in the dataset, ignoring filters.
pub async fn get_topics(State(state): State<AppState>) -> Json<BTreeSet<String>> {
    Json(state.store.topics().await)
}

/// GET /api/tags
///
/// Discourse tags keyed by id.
pub async fn get_tags(State(state): State<AppState>) -> Json<HashMap<String, DiscourseTag>> {
    Json(state.store.discourse_tag_map().await)
}
