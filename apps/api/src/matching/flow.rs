//! External matching flow — the boundary to the generative backend.
//!
//! The flow owns no matching logic; it ships the CV text to the model and
//! returns whatever records the model produced. This module only enforces the
//! wire contract and bounds the call with a deadline and an abort token.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::llm_client::{LlmClient, LlmError};
use crate::matching::prompts::{build_matcher_prompt, matcher_system};
use crate::models::internship::{MatchRecord, MatchRequest, MatchResponse};

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Matching flow call failed: {0}")]
    Llm(LlmError),

    #[error("Malformed matching response: {0}")]
    Malformed(String),

    #[error("Matching flow timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("Matching flow was cancelled")]
    Cancelled,
}

impl From<LlmError> for FlowError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Parse(e) => FlowError::Malformed(e.to_string()),
            LlmError::EmptyContent => FlowError::Malformed("empty model output".to_string()),
            other => FlowError::Llm(other),
        }
    }
}

/// Anything that can turn `{ resume }` into `{ results }`.
#[async_trait]
pub trait MatchingFlow: Send + Sync {
    async fn suggest(&self, request: &MatchRequest) -> Result<MatchResponse, FlowError>;
}

/// Default flow: the strict-recruiter prompt sent through the shared `LlmClient`.
pub struct LlmMatchingFlow {
    llm: LlmClient,
}

impl LlmMatchingFlow {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl MatchingFlow for LlmMatchingFlow {
    async fn suggest(&self, request: &MatchRequest) -> Result<MatchResponse, FlowError> {
        let prompt = build_matcher_prompt(&request.resume);
        let response = self
            .llm
            .call_json::<MatchResponse>(&prompt, &matcher_system())
            .await?;
        debug!(
            "Matching flow returned {} records (model: {})",
            response.results.len(),
            self.llm.model()
        );
        Ok(response)
    }
}

/// Runs one flow call bounded by `deadline` and `cancel`, then checks the
/// response against the contract. A single attempt; nothing is retried.
pub async fn suggest_with_deadline(
    flow: &dyn MatchingFlow,
    request: &MatchRequest,
    deadline: Duration,
    cancel: &CancellationToken,
) -> Result<Vec<MatchRecord>, FlowError> {
    let response = tokio::select! {
        _ = cancel.cancelled() => {
            warn!("Matching flow call cancelled");
            return Err(FlowError::Cancelled);
        }
        outcome = tokio::time::timeout(deadline, flow.suggest(request)) => match outcome {
            Ok(response) => response?,
            Err(_) => {
                warn!("Matching flow call exceeded {}s deadline", deadline.as_secs());
                return Err(FlowError::TimedOut(deadline));
            }
        },
    };

    validate_response(response)
}

/// Rejects the whole response if any record breaks the contract.
pub fn validate_response(response: MatchResponse) -> Result<Vec<MatchRecord>, FlowError> {
    for (index, record) in response.results.iter().enumerate() {
        let required = [
            ("company", &record.company),
            ("role", &record.role),
            ("directCareerLink", &record.direct_career_link),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(FlowError::Malformed(format!(
                    "result {index}: '{field}' is blank"
                )));
            }
        }

        let link = record.direct_career_link.trim().to_ascii_lowercase();
        if !(link.starts_with("https://") || link.starts_with("http://")) {
            return Err(FlowError::Malformed(format!(
                "result {index}: directCareerLink '{}' is not an http(s) URL",
                record.direct_career_link
            )));
        }
    }
    Ok(response.results)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    pub(crate) fn acme() -> MatchRecord {
        MatchRecord {
            company: "Acme".to_string(),
            role: "Data Intern".to_string(),
            cv_match_reason: "matches Python skills".to_string(),
            skills_required: "Python, SQL".to_string(),
            location: "Remote".to_string(),
            direct_career_link: "https://acme.example/careers/1".to_string(),
        }
    }

    /// Flow stub that replays a fixed response and records every request.
    pub(crate) struct StubFlow {
        response: Mutex<Option<Result<MatchResponse, FlowError>>>,
        pub calls: AtomicUsize,
        pub last_resume: Mutex<Option<String>>,
    }

    impl StubFlow {
        pub(crate) fn returning(results: Vec<MatchRecord>) -> Self {
            Self::with(Ok(MatchResponse { results }))
        }

        pub(crate) fn failing(err: FlowError) -> Self {
            Self::with(Err(err))
        }

        fn with(response: Result<MatchResponse, FlowError>) -> Self {
            Self {
                response: Mutex::new(Some(response)),
                calls: AtomicUsize::new(0),
                last_resume: Mutex::new(None),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MatchingFlow for StubFlow {
        async fn suggest(&self, request: &MatchRequest) -> Result<MatchResponse, FlowError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_resume.lock().unwrap() = Some(request.resume.clone());
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(FlowError::Malformed("stub already used".into())))
        }
    }

    /// Flow that never answers.
    pub(crate) struct HangingFlow;

    #[async_trait]
    impl MatchingFlow for HangingFlow {
        async fn suggest(&self, _request: &MatchRequest) -> Result<MatchResponse, FlowError> {
            std::future::pending().await
        }
    }

    fn request() -> MatchRequest {
        MatchRequest {
            resume: "x".repeat(120),
        }
    }

    #[tokio::test]
    async fn test_valid_response_passes_through() {
        let flow = StubFlow::returning(vec![acme()]);
        let records = suggest_with_deadline(
            &flow,
            &request(),
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(records, vec![acme()]);
        assert_eq!(flow.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_flow_times_out() {
        let err = suggest_with_deadline(
            &HangingFlow,
            &request(),
            Duration::from_secs(30),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FlowError::TimedOut(d) if d == Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_cancelled_token_aborts_call() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = suggest_with_deadline(&HangingFlow, &request(), Duration::from_secs(30), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Cancelled));
    }

    #[test]
    fn test_blank_company_is_malformed() {
        let mut record = acme();
        record.company = "  ".to_string();
        let err = validate_response(MatchResponse {
            results: vec![acme(), record],
        })
        .unwrap_err();
        assert!(err.to_string().contains("result 1: 'company' is blank"));
    }

    #[test]
    fn test_non_http_link_is_malformed() {
        let mut record = acme();
        record.direct_career_link = "acme.example/careers".to_string();
        let err = validate_response(MatchResponse {
            results: vec![record],
        })
        .unwrap_err();
        assert!(matches!(err, FlowError::Malformed(_)));
    }

    #[test]
    fn test_empty_response_is_valid() {
        let records = validate_response(MatchResponse { results: vec![] }).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_unparseable_model_output_maps_to_malformed() {
        let err: FlowError = crate::llm_client::parse_json_text::<MatchResponse>("not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, FlowError::Malformed(_)));
    }
}
