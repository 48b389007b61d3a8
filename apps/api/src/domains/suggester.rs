//! Domain suggestion flow: input checks, the LLM call, and output cleanup.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domains::prompts::{advisor_system, build_domain_prompt};
use crate::llm_client::{LlmClient, LlmError};

/// Upper bound on returned domains.
pub const MAX_SUGGESTIONS: usize = 5;

const MIN_BACKGROUND_CHARS: usize = 10;
const MIN_INTERESTS_CHARS: usize = 10;
const MIN_RESUME_CHARS: usize = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct DomainRequest {
    pub background: String,
    pub interests: String,
    pub resume: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSuggestions {
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainField {
    Background,
    Interests,
    Resume,
}

#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("{field:?} too short: {length} characters (min: {min})")]
    TooShort {
        field: DomainField,
        length: usize,
        min: usize,
    },

    #[error("Domain suggestion call failed: {0}")]
    Llm(LlmError),

    #[error("Malformed domain suggestions: {0}")]
    Malformed(String),

    #[error("Domain suggestion timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

impl From<LlmError> for SuggestionError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Parse(e) => SuggestionError::Malformed(e.to_string()),
            LlmError::EmptyContent => SuggestionError::Malformed("empty model output".to_string()),
            other => SuggestionError::Llm(other),
        }
    }
}

impl SuggestionError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SuggestionError::TooShort {
                field: DomainField::Background,
                ..
            } => "Please provide more details about your background.",
            SuggestionError::TooShort {
                field: DomainField::Interests,
                ..
            } => "Please provide more details about your interests.",
            SuggestionError::TooShort {
                field: DomainField::Resume,
                ..
            } => "Please paste a substantial part of your resume.",
            _ => "Failed to get suggestions. Please try again.",
        }
    }
}

/// Anything that can turn background, interests and CV text into domains.
#[async_trait]
pub trait DomainSuggester: Send + Sync {
    async fn suggest_domains(
        &self,
        request: &DomainRequest,
    ) -> Result<DomainSuggestions, SuggestionError>;
}

pub struct LlmDomainSuggester {
    llm: LlmClient,
}

impl LlmDomainSuggester {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl DomainSuggester for LlmDomainSuggester {
    async fn suggest_domains(
        &self,
        request: &DomainRequest,
    ) -> Result<DomainSuggestions, SuggestionError> {
        let prompt = build_domain_prompt(
            request.background.trim(),
            request.interests.trim(),
            request.resume.trim(),
        );
        let response = self
            .llm
            .call_json::<DomainSuggestions>(&prompt, &advisor_system())
            .await?;
        debug!(
            "Domain suggester returned {} items (model: {})",
            response.suggestions.len(),
            self.llm.model()
        );
        Ok(response)
    }
}

/// Checks every field against its minimum length, in form order.
pub fn validate_request(request: &DomainRequest) -> Result<(), SuggestionError> {
    let fields = [
        (DomainField::Background, &request.background, MIN_BACKGROUND_CHARS),
        (DomainField::Interests, &request.interests, MIN_INTERESTS_CHARS),
        (DomainField::Resume, &request.resume, MIN_RESUME_CHARS),
    ];
    for (field, value, min) in fields {
        let length = value.trim().chars().count();
        if length < min {
            return Err(SuggestionError::TooShort { field, length, min });
        }
    }
    Ok(())
}

/// Validates, makes one bounded call, and cleans the list: trimmed, blanks and
/// case-insensitive duplicates dropped, at most `MAX_SUGGESTIONS` kept.
pub async fn suggest_with_deadline(
    suggester: &dyn DomainSuggester,
    request: &DomainRequest,
    deadline: Duration,
) -> Result<Vec<String>, SuggestionError> {
    validate_request(request)?;

    let response = tokio::time::timeout(deadline, suggester.suggest_domains(request))
        .await
        .map_err(|_| {
            warn!("Domain suggestion exceeded {}s deadline", deadline.as_secs());
            SuggestionError::TimedOut(deadline)
        })??;

    let mut seen = Vec::new();
    let mut suggestions = Vec::new();
    for suggestion in response.suggestions {
        let suggestion = suggestion.trim();
        let key = suggestion.to_lowercase();
        if suggestion.is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        suggestions.push(suggestion.to_string());
        if suggestions.len() == MAX_SUGGESTIONS {
            break;
        }
    }
    Ok(suggestions)
}
