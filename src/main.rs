use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use gptchat_server::services::endpoints::EndpointPool;
use gptchat_server::services::prompts::PromptStore;
use gptchat_server::{config, db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load config
    let config = config::Config::from_env();
    let port = config.port;
    tracing::info!("environment: {}", config.environment.as_str());

    // Initialize database pool
    let db = db::create_pool(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;
    tracing::info!("PostgreSQL connected");

    // Inference endpoint pool; fail fast if production has none configured
    let endpoints = EndpointPool::from_config(&config.ollama_endpoints, config.environment)
        .context("inference endpoint configuration")?;

    // Prompt configuration (hot-reloadable via ?reload_prompts=true)
    let prompts = PromptStore::load(&config.prompt_config_path);

    // Shared HTTP client for upstream relays
    let http = reqwest::Client::new();

    // Build application state
    let state = AppState {
        db,
        config: config.clone(),
        http,
        endpoints: Arc::new(endpoints),
        prompts: Arc::new(prompts),
    };

    // Build CORS layer
    let cors_origins: Vec<String> = config.cors_origins();
    let is_wildcard = cors_origins.len() == 1 && cors_origins[0] == "*";

    let cors = if is_wildcard {
        CorsLayer::new()
            .allow_origin(AllowOrigin::any())
            .allow_methods(AllowMethods::any())
            .allow_headers(AllowHeaders::any())
    } else {
        let origins: Vec<axum::http::HeaderValue> = cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(AllowMethods::any())
            .allow_headers(AllowHeaders::any())
            .allow_credentials(true)
    };

    // Build router
    let app = routes::create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
