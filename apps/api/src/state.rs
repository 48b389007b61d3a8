use std::sync::Arc;

use crate::config::Config;
use crate::domains::suggester::DomainSuggester;
use crate::matching::orchestrator::MatchPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds only immutable configuration and shared clients; no per-upload state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Extractor, matching flow and scorer handed to each new orchestrator.
    pub pipeline: MatchPipeline,
    pub domains: Arc<dyn DomainSuggester>,
}
