//! Text extraction — turns an uploaded CV into plain text.
//!
//! Default: `DocumentExtractor` (pdf-extract for PDF, zip + WordprocessingML for DOCX).
//! The orchestrator holds an `Arc<dyn TextExtractor>` so tests can count or fake calls.

pub mod docx;
pub mod pdf;
pub mod validation;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::models::document::{DocumentKind, UploadedDocument};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Could not read {kind:?} document: {reason}")]
    Unreadable { kind: DocumentKind, reason: String },

    #[error("Document parser crashed: {0}")]
    ParserPanic(String),
}

impl ExtractionError {
    pub fn user_message(&self) -> &'static str {
        "Failed to extract text from file. Please try another file."
    }
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, document: &UploadedDocument) -> Result<String, ExtractionError>;
}

/// Production extractor. Parsing runs on the blocking pool so a slow or
/// panicking parser never stalls or takes down the request task.
pub struct DocumentExtractor;

#[async_trait]
impl TextExtractor for DocumentExtractor {
    async fn extract_text(&self, document: &UploadedDocument) -> Result<String, ExtractionError> {
        let kind = document
            .kind()
            .ok_or_else(|| ExtractionError::UnsupportedType(document.media_type.clone()))?;
        let content = document.content.clone();

        let joined = tokio::task::spawn_blocking(move || match kind {
            DocumentKind::Pdf => pdf::extract_pdf_text(&content),
            DocumentKind::Docx => docx::extract_docx_text(&content),
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(join_err) => {
                warn!("{kind:?} parser aborted: {join_err}");
                Err(ExtractionError::ParserPanic(join_err.to_string()))
            }
        }
    }
}
