use axum::{
    extract::{Query, State},
    Json,
};
use rusqlite::Connection;
use serde_json::{json, Value};

use crate::api::error::{ApiResult, OrServiceError};
use crate::api::types::{AppState, ListParams};
use crate::catalog;
use crate::filter::{CategoryFilter, GroupSize};
use crate::paging::{parse_page, PageWindow, PAGE_SIZE};

/// Groups with more than one unmarked article.
pub async fn list_multiple(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    let filter = CategoryFilter::parse(params.filter.as_deref());
    let page = parse_page(params.page.as_deref());
    let body = state
        .with_db(move |conn| grouped_page(conn, filter, GroupSize::Multiple, page))
        .await
        .or_service("Failed to fetch articles")?;
    Ok(Json(body))
}

/// Groups with exactly one unmarked article. No category filter here.
pub async fn list_single(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    let page = parse_page(params.page.as_deref());
    let body = state
        .with_db(move |conn| grouped_page(conn, CategoryFilter::All, GroupSize::Single, page))
        .await
        .or_service("Failed to fetch single articles")?;
    Ok(Json(body))
}

fn grouped_page(
    conn: &Connection,
    filter: CategoryFilter,
    size: GroupSize,
    page: usize,
) -> anyhow::Result<Value> {
    // Pages are cut from the group list, never from the article rows.
    let keys = catalog::group_keys(conn, filter, size)?;
    let window = PageWindow::clamp(keys.len(), page, PAGE_SIZE);

    if window.is_empty() {
        return Ok(json!({
            "groups": [],
            "totalGroups": 0,
            "hasMore": false,
            "currentPage": window.current_page,
        }));
    }

    let groups = catalog::load_groups(conn, filter, window.slice(&keys))?;
    tracing::debug!(
        filter = filter.as_str(),
        page = window.current_page,
        groups = groups.len(),
        "loaded article page"
    );

    Ok(json!({
        "groups": groups,
        "totalGroups": keys.len(),
        "hasMore": window.has_more(),
        "currentPage": window.current_page,
    }))
}
