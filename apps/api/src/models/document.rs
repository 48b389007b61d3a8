use bytes::Bytes;
use serde::Serialize;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// A CV as received from the client. Lives for one request and is never persisted.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    /// Media type declared by the client. May be empty or generic.
    pub media_type: String,
    pub content: Bytes,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, content: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            content,
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Resolves the document kind from the declared media type first,
    /// then from the file-name suffix.
    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_media_type(&self.media_type)
            .or_else(|| DocumentKind::from_file_name(&self.file_name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        // Strip parameters such as "; charset=binary"
        let essence = media_type.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case(PDF_MEDIA_TYPE) {
            Some(Self::Pdf)
        } else if essence.eq_ignore_ascii_case(DOCX_MEDIA_TYPE) {
            Some(Self::Docx)
        } else {
            None
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.trim().to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            Some(Self::Pdf)
        } else if lower.ends_with(".docx") {
            Some(Self::Docx)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_prefers_declared_media_type() {
        let doc = UploadedDocument::new("cv.docx", PDF_MEDIA_TYPE, Bytes::new());
        assert_eq!(doc.kind(), Some(DocumentKind::Pdf));
    }

    #[test]
    fn test_kind_falls_back_to_suffix() {
        let doc = UploadedDocument::new("My_CV.DOCX", "application/octet-stream", Bytes::new());
        assert_eq!(doc.kind(), Some(DocumentKind::Docx));
    }

    #[test]
    fn test_media_type_parameters_are_ignored() {
        assert_eq!(
            DocumentKind::from_media_type("application/pdf; charset=binary"),
            Some(DocumentKind::Pdf)
        );
    }

    #[test]
    fn test_unknown_kind() {
        let doc = UploadedDocument::new("cv.txt", "text/plain", Bytes::new());
        assert_eq!(doc.kind(), None);
    }
}
