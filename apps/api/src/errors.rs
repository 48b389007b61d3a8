use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domains::suggester::SuggestionError;
use crate::matching::flow::FlowError;
use crate::matching::orchestrator::PipelineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Suggestion(#[from] SuggestionError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Pipeline(err) => {
                let (status, code) = pipeline_status(err);
                if status.is_server_error() {
                    tracing::error!("Analysis error: {err}");
                }
                (status, code, err.user_message().to_string())
            }
            AppError::Suggestion(err) => {
                let (status, code) = suggestion_status(err);
                if status.is_server_error() {
                    tracing::error!("Domain suggestion error: {err}");
                }
                (status, code, err.user_message().to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

fn pipeline_status(err: &PipelineError) -> (StatusCode, &'static str) {
    match err {
        PipelineError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        PipelineError::NoFileSelected => (StatusCode::BAD_REQUEST, "NO_FILE_SELECTED"),
        PipelineError::NotIdle(_) => (StatusCode::CONFLICT, "ANALYSIS_NOT_IDLE"),
        PipelineError::Extraction(_) => (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_ERROR"),
        PipelineError::EmptyOrTooShort { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "CV_TOO_SHORT")
        }
        PipelineError::Analysis(FlowError::TimedOut(_)) => {
            (StatusCode::GATEWAY_TIMEOUT, "ANALYSIS_TIMEOUT")
        }
        PipelineError::Analysis(FlowError::Cancelled) => {
            (StatusCode::SERVICE_UNAVAILABLE, "ANALYSIS_CANCELLED")
        }
        PipelineError::Analysis(_) => (StatusCode::BAD_GATEWAY, "ANALYSIS_ERROR"),
    }
}

fn suggestion_status(err: &SuggestionError) -> (StatusCode, &'static str) {
    match err {
        SuggestionError::TooShort { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        SuggestionError::TimedOut(_) => (StatusCode::GATEWAY_TIMEOUT, "SUGGESTION_TIMEOUT"),
        SuggestionError::Llm(_) | SuggestionError::Malformed(_) => {
            (StatusCode::BAD_GATEWAY, "SUGGESTION_ERROR")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::extraction::validation::ValidationError;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = PipelineError::Validation(ValidationError::EmptyFile);
        assert_eq!(pipeline_status(&err).0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_flow_failures_map_to_gateway_statuses() {
        let timeout = PipelineError::Analysis(FlowError::TimedOut(Duration::from_secs(90)));
        assert_eq!(pipeline_status(&timeout).0, StatusCode::GATEWAY_TIMEOUT);

        let malformed = PipelineError::Analysis(FlowError::Malformed("x".into()));
        assert_eq!(pipeline_status(&malformed).0, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_too_short_is_unprocessable() {
        let err = PipelineError::EmptyOrTooShort { length: 3, min: 100 };
        assert_eq!(
            AppError::from(err).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_suggestion_errors_map_like_analysis_errors() {
        let timeout = SuggestionError::TimedOut(Duration::from_secs(90));
        assert_eq!(suggestion_status(&timeout).0, StatusCode::GATEWAY_TIMEOUT);

        let malformed = SuggestionError::Malformed("x".into());
        assert_eq!(
            AppError::from(malformed).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_cancelled_analysis_is_unavailable() {
        let err = PipelineError::Analysis(FlowError::Cancelled);
        assert_eq!(
            pipeline_status(&err),
            (StatusCode::SERVICE_UNAVAILABLE, "ANALYSIS_CANCELLED")
        );
    }
}
