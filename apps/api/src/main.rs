mod config;
mod errors;
mod jobs;
mod llm_client;
mod outreach;
mod routes;
mod scrape;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::jobs::InMemoryJobStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scrape::PageExtractor;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting outreach API v{}", env!("CARGO_PKG_VERSION"));

    let pages = PageExtractor::new(config.fetch_timeout, config.page_text_max_chars)?;
    info!(
        "Page extractor initialized (timeout: {:?}, cap: {} chars)",
        config.fetch_timeout, config.page_text_max_chars
    );

    // Credential is read on the first generation call, not here
    let llm = LlmClient::new(config.llm_timeout);
    info!("LLM client configured (model: {})", llm_client::MODEL);

    let state = AppState {
        config: config.clone(),
        pages: Arc::new(pages),
        llm: Arc::new(llm),
        jobs: Arc::new(InMemoryJobStore::new()),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
