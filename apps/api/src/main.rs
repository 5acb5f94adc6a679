mod config;
mod document;
mod errors;
mod llm_client;
mod models;
mod review;
mod routes;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::OpenAiClient;
use crate::routes::build_router;
use crate::session::store::{spawn_eviction, SessionStore};
use crate::session::ModelSelection;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing API key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Review API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize completion client
    let llm = OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!(
        "LLM client initialized (base: {}, review model: {}, chat model: {}, timeout: {}s)",
        config.openai_base_url, config.review_model, config.chat_model, config.llm_timeout_secs
    );

    // Idle sessions are swept at most once a minute
    let sessions = SessionStore::new();
    let idle_ttl = Duration::from_secs(config.session_idle_ttl_secs);
    spawn_eviction(sessions.clone(), idle_ttl, idle_ttl.min(Duration::from_secs(60)));
    info!("Session idle TTL: {}s", config.session_idle_ttl_secs);

    // Build app state
    let state = AppState {
        sessions,
        llm: Arc::new(llm),
        models: ModelSelection {
            review: config.review_model.clone(),
            chat: config.chat_model.clone(),
        },
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
