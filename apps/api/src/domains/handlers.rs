//! Axum route handler for domain suggestions.

use axum::{extract::State, Json};

use crate::domains::suggester::{suggest_with_deadline, DomainRequest, DomainSuggestions};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/domains
///
/// Suggests up to five internship domains from background, interests and CV text.
pub async fn handle_suggest_domains(
    State(state): State<AppState>,
    Json(request): Json<DomainRequest>,
) -> Result<Json<DomainSuggestions>, AppError> {
    let suggestions = suggest_with_deadline(
        state.domains.as_ref(),
        &request,
        state.config.match_timeout,
    )
    .await?;
    Ok(Json(DomainSuggestions { suggestions }))
}
