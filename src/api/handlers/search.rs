use axum::{
    extract::{Query, State},
    Json,
};
use rusqlite::Connection;
use serde_json::{json, Value};

use crate::api::error::{ApiResult, OrServiceError};
use crate::api::types::{AppState, SearchParams};
use crate::catalog;
use crate::filter::{Conditions, SearchScope};
use crate::model::group_by_input_code;
use crate::paging::{parse_limit, parse_page, total_pages};

/// Substring search over unmarked articles, or over import failures with
/// `filter=not-found`. Article hits are paged per record and grouped by
/// input code for display.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Value>> {
    let term = params.q.as_deref().map(str::trim).unwrap_or_default().to_string();
    if term.is_empty() {
        return Ok(Json(json!({
            "results": [],
            "total": 0,
            "page": 1,
            "totalPages": 0,
            "hasMore": false,
        })));
    }

    let scope = SearchScope::parse(params.filter.as_deref());
    let page = parse_page(params.page.as_deref());
    let limit = parse_limit(params.limit.as_deref());

    let body = state
        .with_db(move |conn| run_search(conn, &term, scope, page, limit))
        .await
        .or_service("Failed to search articles")?;
    Ok(Json(body))
}

fn run_search(
    conn: &Connection,
    term: &str,
    scope: SearchScope,
    page: usize,
    limit: usize,
) -> anyhow::Result<Value> {
    let offset = page.saturating_sub(1).saturating_mul(limit);

    let (results, total) = match scope {
        SearchScope::NotFound => {
            let (rows, total) = catalog::search_not_found(conn, term, offset, limit)?;
            (serde_json::to_value(rows)?, total)
        }
        SearchScope::Single => {
            let mut cond = Conditions::unmarked();
            cond.push(
                "a.input_code IN (
                   SELECT input_code FROM articles
                   WHERE article_exists IS NULL
                   GROUP BY input_code
                   HAVING COUNT(*) = 1)",
            );
            cond.text_match(term);
            article_hits(conn, &cond, offset, limit)?
        }
        SearchScope::Category(filter) => {
            let mut cond = Conditions::unmarked();
            cond.category(filter);
            cond.text_match(term);
            article_hits(conn, &cond, offset, limit)?
        }
    };

    tracing::debug!(?scope, total, page, "search finished");
    Ok(json!({
        "results": results,
        "total": total,
        "page": page,
        "totalPages": total_pages(total, limit),
        "hasMore": page.saturating_mul(limit) < total,
    }))
}

fn article_hits(
    conn: &Connection,
    cond: &Conditions,
    offset: usize,
    limit: usize,
) -> anyhow::Result<(Value, usize)> {
    let total = catalog::count_articles(conn, cond)?;
    let articles = catalog::query_articles(conn, cond, Some((offset, limit)))?;
    Ok((serde_json::to_value(group_by_input_code(articles))?, total))
}
