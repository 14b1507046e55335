use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobassist-api"
    }))
}

/// GET /api/db_test
/// Round-trips a trivial query through the pool.
pub async fn db_test_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&state.db).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Database connection successful.",
        "result": one
    })))
}
