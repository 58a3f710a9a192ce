use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::api::error::{ApiResult, OrServiceError};
use crate::api::types::{AppState, ListParams};
use crate::catalog;
use crate::paging::{parse_page, PageWindow, PAGE_SIZE};

/// Import failures, newest first.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    let page = parse_page(params.page.as_deref());
    let body = state
        .with_db(move |conn| {
            let total = catalog::not_found_count(conn)?;
            let window = PageWindow::clamp(total, page, PAGE_SIZE);
            if window.is_empty() {
                return Ok(json!({
                    "articles": [],
                    "totalArticles": 0,
                    "hasMore": false,
                    "currentPage": window.current_page,
                }));
            }
            let articles = catalog::not_found_page(conn, window.offset, PAGE_SIZE)?;
            Ok(json!({
                "articles": articles,
                "totalArticles": total,
                "hasMore": window.has_more(),
                "currentPage": window.current_page,
            }))
        })
        .await
        .or_service("Failed to fetch not found articles")?;
    Ok(Json(body))
}
