pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use sqlx::PgPool;

use services::endpoints::EndpointPool;
use services::prompts::PromptStore;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: config::Config,
    pub http: reqwest::Client,
    pub endpoints: Arc<EndpointPool>,
    pub prompts: Arc<PromptStore>,
}
