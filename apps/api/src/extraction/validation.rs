//! Upload validation. Runs before any byte of the document is parsed.

use thiserror::Error;

use crate::models::document::{DocumentKind, UploadedDocument};

/// Largest accepted CV: 5 MiB.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("Unsupported file type: '{media_type}' ({file_name})")]
    UnsupportedType {
        media_type: String,
        file_name: String,
    },

    #[error("Empty file")]
    EmptyFile,
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::TooLarge { .. } => "File size must be less than 5MB",
            ValidationError::UnsupportedType { .. } => "Please upload a PDF or DOCX file",
            ValidationError::EmptyFile => "The selected file is empty. Please choose another file.",
        }
    }
}

/// Checks size first, then type. Pure: the same document always yields the same outcome.
pub fn validate_file(document: &UploadedDocument) -> Result<DocumentKind, ValidationError> {
    let size = document.size();
    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            size,
            max: MAX_UPLOAD_BYTES,
        });
    }

    let kind = document
        .kind()
        .ok_or_else(|| ValidationError::UnsupportedType {
            media_type: document.media_type.clone(),
            file_name: document.file_name.clone(),
        })?;

    if size == 0 {
        return Err(ValidationError::EmptyFile);
    }

    Ok(kind)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::models::document::{DOCX_MEDIA_TYPE, PDF_MEDIA_TYPE};

    fn doc(name: &str, media_type: &str, size: usize) -> UploadedDocument {
        UploadedDocument::new(name, media_type, Bytes::from(vec![b'x'; size]))
    }

    #[test]
    fn test_oversized_rejected_regardless_of_type() {
        for (name, media_type) in [
            ("cv.pdf", PDF_MEDIA_TYPE),
            ("cv.docx", DOCX_MEDIA_TYPE),
            ("cv.txt", "text/plain"),
        ] {
            let err = validate_file(&doc(name, media_type, MAX_UPLOAD_BYTES + 1)).unwrap_err();
            assert!(matches!(err, ValidationError::TooLarge { .. }), "{name}");
            assert!(err.to_string().contains("too large"));
        }
    }

    #[test]
    fn test_exactly_five_mib_is_accepted() {
        let kind = validate_file(&doc("cv.pdf", PDF_MEDIA_TYPE, MAX_UPLOAD_BYTES)).unwrap();
        assert_eq!(kind, DocumentKind::Pdf);
    }

    #[test]
    fn test_unsupported_type_rejected() {
        for (name, media_type) in [
            ("cv.txt", "text/plain"),
            ("cv.doc", "application/msword"),
            ("photo.png", "image/png"),
            ("cv", ""),
        ] {
            let err = validate_file(&doc(name, media_type, 1024)).unwrap_err();
            assert!(
                matches!(err, ValidationError::UnsupportedType { .. }),
                "{name} should be unsupported"
            );
            assert!(err.to_string().contains("Unsupported file type"));
        }
    }

    #[test]
    fn test_docx_accepted_by_suffix_alone() {
        let kind = validate_file(&doc("resume.docx", "application/octet-stream", 10)).unwrap();
        assert_eq!(kind, DocumentKind::Docx);
    }

    #[test]
    fn test_empty_file_rejected() {
        let err = validate_file(&doc("cv.pdf", PDF_MEDIA_TYPE, 0)).unwrap_err();
        assert_eq!(err, ValidationError::EmptyFile);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let valid = doc("cv.pdf", PDF_MEDIA_TYPE, 2048);
        assert_eq!(validate_file(&valid), validate_file(&valid));

        let invalid = doc("cv.pdf", PDF_MEDIA_TYPE, MAX_UPLOAD_BYTES * 2);
        assert_eq!(validate_file(&invalid), validate_file(&invalid));
    }
}
