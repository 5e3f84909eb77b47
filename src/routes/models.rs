use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};

use crate::services::ollama;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/models", get(list_models))
}

/// Model options for the current environment, plus the default the UI
/// should preselect.
async fn list_models(State(state): State<AppState>) -> Json<Value> {
    let environment = state.config.environment;
    Json(json!({
        "models": ollama::model_options(environment),
        "defaultModel": ollama::default_model(environment),
        "environment": environment.as_str(),
        "success": true,
    }))
}
