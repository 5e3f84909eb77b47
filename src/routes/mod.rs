pub mod auth;
pub mod generate;
pub mod health;
pub mod models;

use axum::Router;

use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(models::router())
        .merge(generate::router())
        .with_state(state)
}
