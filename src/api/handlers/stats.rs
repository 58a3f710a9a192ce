use axum::{extract::State, Json};

use crate::api::error::{ApiResult, OrServiceError};
use crate::api::types::AppState;
use crate::catalog;
use crate::model::{FilterCounts, ReviewStats};

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<ReviewStats>> {
    let stats = state
        .with_db(catalog::review_stats)
        .await
        .or_service("Failed to fetch stats")?;
    Ok(Json(stats))
}

pub async fn filter_counts(State(state): State<AppState>) -> ApiResult<Json<FilterCounts>> {
    let counts = state
        .with_db(catalog::filter_counts)
        .await
        .or_service("Failed to fetch filter counts")?;
    Ok(Json(counts))
}
