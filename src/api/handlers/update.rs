use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};

use crate::api::error::{ApiError, ApiResult, OrServiceError};
use crate::api::types::AppState;
use crate::catalog;

// Bodies are taken as raw JSON so that every malformed shape (bad JSON,
// wrong types, missing fields) ends in the same 400 before the database is touched.

fn parse_body(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "unreadable update body");
            Err(ApiError::invalid_request())
        }
    }
}

fn parse_flag(body: &Value) -> ApiResult<bool> {
    body.get("exists")
        .and_then(Value::as_bool)
        .ok_or_else(ApiError::invalid_request)
}

/// Any JSON number with no fractional part that fits an `i64`, so `5` and
/// `5.0` name the same article.
fn parse_id(body: &Value) -> ApiResult<i64> {
    let id = body.get("id").ok_or_else(ApiError::invalid_request)?;
    if let Some(id) = id.as_i64() {
        return Ok(id);
    }
    id.as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
        .map(|f| f as i64)
        .ok_or_else(ApiError::invalid_request)
}

/// Sets the flag on one article, whatever its current state.
pub async fn update_one(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let body = parse_body(payload)?;
    let id = parse_id(&body)?;
    let exists = parse_flag(&body)?;

    let updated = state
        .with_db(move |conn| catalog::set_article_exists(conn, id, exists))
        .await
        .or_service("Failed to update article")?;
    let Some(article) = updated else {
        return Err(ApiError::service(
            "Failed to update article",
            anyhow::anyhow!("article {} not found", id),
        ));
    };

    tracing::info!(id, exists, "article flag set");
    Ok(Json(json!({ "success": true, "article": article })))
}

/// Sets the flag on every unmarked article sharing an input code.
pub async fn bulk_update(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let body = parse_body(payload)?;
    let input_code = body
        .get("inputCode")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(ApiError::invalid_request)?;
    let exists = parse_flag(&body)?;

    let code = input_code.clone();
    let updated_count = state
        .with_db(move |conn| {
            let changed = catalog::bulk_set_exists(conn, &code, exists)?;
            if changed == 0 && !catalog::input_code_known(conn, &code)? {
                tracing::warn!(input_code = %code, "bulk update for unknown input code");
            }
            Ok(changed)
        })
        .await
        .or_service("Failed to bulk update articles")?;

    tracing::info!(input_code = %input_code, exists, updated_count, "group flags set");
    Ok(Json(json!({
        "success": true,
        "updatedCount": updated_count,
        "inputCode": input_code,
        "exists": exists,
    })))
}
