use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let mut db_status = "ok";

    if sqlx::query("SELECT 1").execute(&state.db).await.is_err() {
        db_status = "error";
    }

    let (status, code) = if db_status == "ok" {
        ("ok", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        code,
        Json(json!({
            "status": status,
            "db": db_status,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}
