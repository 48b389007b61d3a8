mod config;
mod domains;
mod errors;
mod extraction;
mod llm_client;
mod matching;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::domains::suggester::LlmDomainSuggester;
use crate::extraction::DocumentExtractor;
use crate::llm_client::LlmClient;
use crate::matching::flow::LlmMatchingFlow;
use crate::matching::orchestrator::MatchPipeline;
use crate::matching::scoring::{MatchScorer, NoScorer, SkillOverlapScorer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Placement API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client and the matching flow built on it
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        config.llm_api_url.clone(),
        config.llm_model.clone(),
    );
    info!("LLM client initialized (model: {})", llm.model());

    // Real scores only; with scoring off the field is simply absent
    let scorer: Arc<dyn MatchScorer> = if config.enable_match_scoring {
        Arc::new(SkillOverlapScorer)
    } else {
        Arc::new(NoScorer)
    };

    let pipeline = MatchPipeline {
        extractor: Arc::new(DocumentExtractor),
        flow: Arc::new(LlmMatchingFlow::new(llm.clone())),
        scorer,
        flow_timeout: config.match_timeout,
    };
    info!(
        "Match pipeline ready (timeout: {}s, scoring: {})",
        config.match_timeout.as_secs(),
        config.enable_match_scoring
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        pipeline,
        domains: Arc::new(LlmDomainSuggester::new(llm)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the marketing site origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
