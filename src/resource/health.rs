use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use super::AppState;

/// Storage health check
pub async fn health(
    State((backend, _)): State<AppState>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    backend.health_check().await.map_err(|e| e.to_response())?;
    Ok((StatusCode::OK, Json(json!({"status": "UP"}))))
}
