use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::api::error::{ApiResult, OrServiceError};
use crate::api::types::AppState;

pub async fn health(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state
        .with_db(|conn| {
            conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?;
            Ok(())
        })
        .await
        .or_service("Database unavailable")?;

    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
