//! CV upload & match orchestrator.
//!
//! One `CvOrchestrator` drives one upload through
//! `idle → uploading → extracting → analyzing → complete`, with `error`
//! reachable from every step. `complete` and `error` are terminal until a new
//! file is selected. Every failure is caught here and turned into a
//! user-facing message; nothing escapes as a panic and nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::extraction::validation::{validate_file, ValidationError};
use crate::extraction::{ExtractionError, TextExtractor};
use crate::matching::flow::{suggest_with_deadline, FlowError, MatchingFlow};
use crate::matching::scoring::MatchScorer;
use crate::models::document::{DocumentKind, UploadedDocument};
use crate::models::internship::{MatchRequest, MatchResult};

/// Extracted text below this many characters is never sent for matching.
pub const MIN_RESUME_CHARS: usize = 100;

pub const NO_MATCHES_MESSAGE: &str =
    "No matching internships found. Try updating your CV with more details.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPhase {
    Idle,
    Uploading,
    Extracting,
    Analyzing,
    Complete,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Matches(Vec<MatchResult>),
    /// Zero results is a valid, displayed outcome.
    NoMatches,
}

impl MatchOutcome {
    pub fn results(&self) -> &[MatchResult] {
        match self {
            MatchOutcome::Matches(results) => results,
            MatchOutcome::NoMatches => &[],
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            MatchOutcome::Matches(_) => None,
            MatchOutcome::NoMatches => Some(NO_MATCHES_MESSAGE),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Extracted text too short: {length} characters (min: {min})")]
    EmptyOrTooShort { length: usize, min: usize },

    #[error("Analysis failed: {0}")]
    Analysis(#[from] FlowError),

    #[error("No file selected")]
    NoFileSelected,

    #[error("Analysis cannot start from the {0:?} phase")]
    NotIdle(AnalysisPhase),
}

impl PipelineError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::Validation(e) => e.user_message(),
            PipelineError::Extraction(e) => e.user_message(),
            PipelineError::EmptyOrTooShort { .. } => {
                "CV appears to be empty or too short. Please upload a valid CV."
            }
            PipelineError::Analysis(FlowError::TimedOut(_)) => {
                "The analysis took too long to complete. Please try again."
            }
            PipelineError::Analysis(FlowError::Cancelled) => "The analysis was cancelled.",
            PipelineError::Analysis(_) => {
                "An error occurred while analyzing your CV. Please try again."
            }
            PipelineError::NoFileSelected => "Please select a CV to analyze.",
            PipelineError::NotIdle(_) => {
                "An analysis has already run for this file. Select a file to start again."
            }
        }
    }
}

/// Collaborators shared by every orchestrator. Cheap to clone.
#[derive(Clone)]
pub struct MatchPipeline {
    pub extractor: Arc<dyn TextExtractor>,
    pub flow: Arc<dyn MatchingFlow>,
    pub scorer: Arc<dyn MatchScorer>,
    /// Deadline for the flow call.
    pub flow_timeout: Duration,
}

impl MatchPipeline {
    pub fn orchestrator(&self) -> CvOrchestrator {
        CvOrchestrator::new(self.clone())
    }
}

pub struct CvOrchestrator {
    pipeline: MatchPipeline,
    analysis_id: Uuid,
    phase: AnalysisPhase,
    history: Vec<AnalysisPhase>,
    document: Option<UploadedDocument>,
    outcome: Option<MatchOutcome>,
    error_message: Option<&'static str>,
    cancel: CancellationToken,
}

impl CvOrchestrator {
    pub fn new(pipeline: MatchPipeline) -> Self {
        Self {
            pipeline,
            analysis_id: Uuid::new_v4(),
            phase: AnalysisPhase::Idle,
            history: vec![AnalysisPhase::Idle],
            document: None,
            outcome: None,
            error_message: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn analysis_id(&self) -> Uuid {
        self.analysis_id
    }

    pub fn phase(&self) -> AnalysisPhase {
        self.phase
    }

    /// Every phase entered since the current file was selected, in order.
    pub fn history(&self) -> &[AnalysisPhase] {
        &self.history
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.error_message
    }

    /// Aborts an in-flight flow call. Valid until the next `select_file`.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Replaces the selected file and clears all prior state, then validates it.
    /// A rejected file leaves the orchestrator in `error` with no file selected.
    pub fn select_file(
        &mut self,
        document: UploadedDocument,
    ) -> Result<DocumentKind, PipelineError> {
        self.reset();
        match validate_file(&document) {
            Ok(kind) => {
                info!(
                    analysis_id = %self.analysis_id,
                    "Selected {kind:?} CV '{}' ({} bytes)",
                    document.file_name,
                    document.size()
                );
                self.document = Some(document);
                Ok(kind)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Runs extraction and matching for the selected file.
    pub async fn analyze(&mut self) -> Result<MatchOutcome, PipelineError> {
        if self.phase != AnalysisPhase::Idle {
            warn!(analysis_id = %self.analysis_id, "analyze() refused in {:?}", self.phase);
            return Err(PipelineError::NotIdle(self.phase));
        }

        match self.run().await {
            Ok(outcome) => {
                info!(
                    analysis_id = %self.analysis_id,
                    "Analysis complete: {} results",
                    outcome.results().len()
                );
                self.outcome = Some(outcome.clone());
                self.transition(AnalysisPhase::Complete);
                Ok(outcome)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    async fn run(&mut self) -> Result<MatchOutcome, PipelineError> {
        let document = self.document.clone().ok_or(PipelineError::NoFileSelected)?;

        // The document arrives fully buffered; uploading ends once it is owned here.
        self.transition(AnalysisPhase::Uploading);

        self.transition(AnalysisPhase::Extracting);
        let text = self.pipeline.extractor.extract_text(&document).await?;
        let resume = text.trim().to_string();
        let length = resume.chars().count();
        if length < MIN_RESUME_CHARS {
            return Err(PipelineError::EmptyOrTooShort {
                length,
                min: MIN_RESUME_CHARS,
            });
        }

        self.transition(AnalysisPhase::Analyzing);
        let request = MatchRequest { resume };
        let records = suggest_with_deadline(
            self.pipeline.flow.as_ref(),
            &request,
            self.pipeline.flow_timeout,
            &self.cancel,
        )
        .await?;

        let results: Vec<MatchResult> = records
            .into_iter()
            .map(|record| {
                let match_score = self.pipeline.scorer.score(&request.resume, &record);
                MatchResult {
                    match_score,
                    ..MatchResult::from(record)
                }
            })
            .collect();

        Ok(if results.is_empty() {
            MatchOutcome::NoMatches
        } else {
            MatchOutcome::Matches(results)
        })
    }

    fn reset(&mut self) {
        self.analysis_id = Uuid::new_v4();
        self.phase = AnalysisPhase::Idle;
        self.history = vec![AnalysisPhase::Idle];
        self.document = None;
        self.outcome = None;
        self.error_message = None;
        self.cancel = CancellationToken::new();
    }

    fn transition(&mut self, next: AnalysisPhase) {
        debug!(analysis_id = %self.analysis_id, "{:?} -> {:?}", self.phase, next);
        self.phase = next;
        self.history.push(next);
    }

    fn fail(&mut self, err: PipelineError) -> PipelineError {
        warn!(analysis_id = %self.analysis_id, "Analysis failed in {:?}: {err}", self.phase);
        self.error_message = Some(err.user_message());
        self.outcome = None;
        if matches!(err, PipelineError::Validation(_)) {
            self.document = None;
        }
        self.transition(AnalysisPhase::Error);
        err
    }
}
