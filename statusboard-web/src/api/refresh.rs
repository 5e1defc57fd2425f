//! Manual refresh endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statusboard_common::store::{LoadOutcome, StoreStatus};

use crate::AppState;

/// Query parameters for a refresh
#[derive(Debug, Deserialize)]
pub struct RefreshQuery {
    /// Client's last check (RFC 3339); defaults to the store's last update
    pub last_check: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub outcome: LoadOutcome,
    #[serde(flatten)]
    pub status: StoreStatus,
}

/// POST /api/refresh?last_check=TS
///
/// Runs a full reload and answers once it settles.
pub async fn refresh(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> Json<RefreshResponse> {
    let last_check = match query.last_check {
        Some(ts) => Some(ts),
        None => state.store.last_update().await,
    };

    let outcome = state.store.check_for_updates(last_check).await;

    Json(RefreshResponse {
        outcome,
        status: state.store.status().await,
    })
}
