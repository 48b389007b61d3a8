//! Axum route handlers for the Matching API.

use anyhow::anyhow;
use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::BytesMut;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::DropGuard;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::validation::{ValidationError, MAX_UPLOAD_BYTES};
use crate::matching::export::{export_file_name, render_csv, EXPORT_CONTENT_TYPE};
use crate::matching::filter::ResultFilter;
use crate::matching::orchestrator::{AnalysisPhase, CvOrchestrator, MatchOutcome, PipelineError};
use crate::models::document::UploadedDocument;
use crate::models::internship::MatchResult;
use crate::state::AppState;

/// Multipart part carrying the CV.
const FILE_FIELD: &str = "file";

const MALFORMED_UPLOAD_MESSAGE: &str =
    "The upload could not be read. Please select your CV and try again.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub status: AnalysisPhase,
    pub phases: Vec<AnalysisPhase>,
    /// Set when the analysis succeeded with zero matches.
    pub message: Option<&'static str>,
    /// Result count before filtering.
    pub total: usize,
    pub results: Vec<MatchResult>,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub results: Vec<MatchResult>,
    #[serde(flatten)]
    pub filter: ResultFilter,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/matches
///
/// Validates the uploaded CV, extracts its text and returns matching internships.
/// `q` and `location` query parameters narrow the returned list.
///
/// The analysis runs on its own task. If the client goes away the handler
/// future is dropped, its guard cancels the token, and the task stops at the
/// flow call instead of waiting on the model.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Query(filter): Query<ResultFilter>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let document = read_cv_part(multipart, declared_length(&headers))
        .await?
        .ok_or(AppError::Pipeline(PipelineError::NoFileSelected))?;

    let mut orchestrator = state.pipeline.orchestrator();
    orchestrator.select_file(document)?;

    let (guard, task) = spawn_analysis(orchestrator);
    let (orchestrator, result) = task
        .await
        .map_err(|e| AppError::Internal(anyhow!("analysis task failed: {e}")))?;
    guard.disarm();

    if let Err(err) = result {
        info!(
            analysis_id = %orchestrator.analysis_id(),
            "Analysis ended in {:?}: {}",
            orchestrator.phase(),
            orchestrator.error_message().unwrap_or_default()
        );
        return Err(err.into());
    }

    let outcome = orchestrator
        .outcome()
        .ok_or_else(|| AppError::Internal(anyhow!("analysis finished without an outcome")))?;
    Ok(Json(AnalyzeResponse {
        analysis_id: orchestrator.analysis_id(),
        status: orchestrator.phase(),
        phases: orchestrator.history().to_vec(),
        message: outcome.message(),
        total: outcome.results().len(),
        results: filter.apply(outcome.results()),
    }))
}

type AnalysisTask = JoinHandle<(CvOrchestrator, Result<MatchOutcome, PipelineError>)>;

/// Starts the analysis detached from the request. Dropping the guard cancels it.
fn spawn_analysis(mut orchestrator: CvOrchestrator) -> (DropGuard, AnalysisTask) {
    let guard = orchestrator.cancel_token().drop_guard();
    let task = tokio::spawn(async move {
        let result = orchestrator.analyze().await;
        (orchestrator, result)
    });
    (guard, task)
}

/// POST /api/v1/matches/export
///
/// Renders a result list as a CSV table download named after today's date.
pub async fn handle_export(
    Json(request): Json<ExportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let results = request.filter.apply(&request.results);
    let file_name = export_file_name(Utc::now().date_naive());

    Ok((
        [
            (header::CONTENT_TYPE, EXPORT_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        render_csv(&results),
    ))
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Pulls the `file` part out of the form. Other parts are ignored.
async fn read_cv_part(
    mut multipart: Multipart,
    declared: Option<usize>,
) -> Result<Option<UploadedDocument>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, declared))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let media_type = field.content_type().unwrap_or_default().to_string();
        let content = read_capped(field, declared).await?;
        return Ok(Some(UploadedDocument::new(
            file_name,
            media_type,
            content.freeze(),
        )));
    }
    Ok(None)
}

/// Buffers a part chunk by chunk, giving up as soon as it passes the upload cap.
async fn read_capped(
    mut field: Field<'_>,
    declared: Option<usize>,
) -> Result<BytesMut, AppError> {
    let mut content = BytesMut::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, declared))?
    {
        content.extend_from_slice(&chunk);
        if content.len() > MAX_UPLOAD_BYTES {
            return Err(too_large(content.len()));
        }
    }
    Ok(content)
}

/// Body-limit trips surface as multipart errors; they are still an oversized CV.
fn multipart_error(err: MultipartError, declared: Option<usize>) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return too_large(declared.unwrap_or(MAX_UPLOAD_BYTES + 1));
    }
    warn!("Unreadable multipart upload: {}", err.body_text());
    AppError::Validation(MALFORMED_UPLOAD_MESSAGE.to_string())
}

fn too_large(size: usize) -> AppError {
    warn!("Upload rejected before buffering completed: {size} bytes");
    AppError::Pipeline(PipelineError::Validation(ValidationError::TooLarge {
        size,
        max: MAX_UPLOAD_BYTES,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;

    use super::*;
    use crate::extraction::docx::tests::{build_docx, paragraphs_xml};
    use crate::extraction::DocumentExtractor;
    use crate::matching::flow::tests::{acme, HangingFlow, StubFlow};
    use crate::matching::flow::{FlowError, MatchingFlow};
    use crate::matching::orchestrator::MatchPipeline;
    use crate::matching::scoring::NoScorer;
    use crate::models::document::DOCX_MEDIA_TYPE;

    fn selected(flow: Arc<dyn MatchingFlow>) -> CvOrchestrator {
        let pipeline = MatchPipeline {
            extractor: Arc::new(DocumentExtractor),
            flow,
            scorer: Arc::new(NoScorer),
            flow_timeout: Duration::from_secs(300),
        };
        let docx = build_docx(&paragraphs_xml(&[
            "Sam Lee, B.Eng. Computer Engineering",
            "Skills: Python, SQL, embedded C, signal processing",
            "Projects: sensor telemetry pipeline; campus energy dashboard",
        ]));
        let mut orchestrator = pipeline.orchestrator();
        orchestrator
            .select_file(UploadedDocument::new(
                "sam.docx",
                DOCX_MEDIA_TYPE,
                Bytes::from(docx),
            ))
            .unwrap();
        orchestrator
    }

    #[tokio::test]
    async fn test_dropped_guard_cancels_detached_analysis() {
        let (guard, task) = spawn_analysis(selected(Arc::new(HangingFlow)));
        drop(guard);

        let (orchestrator, result) = task.await.unwrap();
        assert!(matches!(
            result,
            Err(PipelineError::Analysis(FlowError::Cancelled))
        ));
        assert_eq!(orchestrator.phase(), AnalysisPhase::Error);
        assert_eq!(
            orchestrator.error_message(),
            Some("The analysis was cancelled.")
        );
    }

    #[tokio::test]
    async fn test_disarmed_guard_keeps_completed_outcome() {
        let (guard, task) = spawn_analysis(selected(Arc::new(StubFlow::returning(vec![acme()]))));

        let (orchestrator, result) = task.await.unwrap();
        guard.disarm();

        assert!(result.is_ok());
        assert_eq!(orchestrator.phase(), AnalysisPhase::Complete);
        assert_eq!(orchestrator.outcome().unwrap().results().len(), 1);
    }

    #[test]
    fn test_declared_length_parses_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(declared_length(&headers), None);
        headers.insert(header::CONTENT_LENGTH, "12582912".parse().unwrap());
        assert_eq!(declared_length(&headers), Some(12 * 1024 * 1024));
    }
}
