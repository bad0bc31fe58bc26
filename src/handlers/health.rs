use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

/// Liveness plus dependency pings.
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.db.health_check().await?;
    state
        .cache
        .health_check()
        .await
        .map_err(ApiError::Internal)?;

    Ok(Json(json!({
        "success": true,
        "message": "API is working",
    })))
}
