//! Resume documents: PDF validation and text extraction.
//!
//! Extraction is a thin wrapper over `pdf-extract`. Page texts are joined with
//! a newline after every page.

use std::path::Path;

use thiserror::Error;

use crate::errors::AppError;

/// Uploads above this size are rejected before extraction.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid file type. Only PDF files are allowed")]
    NotPdf,

    #[error("File too large ({size} bytes). Maximum size is 10MB")]
    TooLarge { size: usize },

    #[error("Failed to extract text from PDF: {0}")]
    Extraction(String),

    #[error("PDF contains no extractable text")]
    Empty,
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotPdf | DocumentError::TooLarge { .. } => {
                AppError::Validation(err.to_string())
            }
            DocumentError::Extraction(_) | DocumentError::Empty => {
                AppError::UnprocessableEntity(err.to_string())
            }
        }
    }
}

/// Extracted resume text plus the name it was uploaded under. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeDocument {
    filename: String,
    text: String,
}

impl ResumeDocument {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
        }
    }

    /// Validates and extracts an uploaded PDF.
    pub fn from_pdf(
        filename: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<Self, DocumentError> {
        if !is_pdf(filename, content_type, bytes) {
            return Err(DocumentError::NotPdf);
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(DocumentError::TooLarge { size: bytes.len() });
        }

        let text = extract_pdf_text(bytes)?;
        if text.trim().is_empty() {
            return Err(DocumentError::Empty);
        }
        Ok(Self::new(filename, text))
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The marker appended to the transcript and to user messages while attached.
    pub fn attachment_marker(&self) -> String {
        format!("[Attached PDF: {}]", self.filename)
    }
}

/// Extracts the text of every page, each followed by a newline.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| DocumentError::Extraction(e.to_string()))?;
    Ok(join_pages(&pages))
}

fn join_pages(pages: &[String]) -> String {
    pages.iter().fold(String::new(), |mut text, page| {
        text.push_str(page);
        text.push('\n');
        text
    })
}

/// True if the upload is named or typed as a PDF and starts with the PDF magic bytes.
pub fn is_pdf(filename: &str, content_type: Option<&str>, head: &[u8]) -> bool {
    let has_pdf_extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    let ct = content_type.unwrap_or("").to_ascii_lowercase();

    (has_pdf_extension || ct.contains("application/pdf")) && head.starts_with(b"%PDF-")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A minimal single-page PDF (Helvetica as `/F1`) whose page draws
    /// `content`, a raw content stream. Offsets and xref are computed here.
    pub(crate) fn one_page_pdf(content: &str) -> Vec<u8> {
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }

        let xref_at = pdf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.extend_from_slice(xref.as_bytes());
        pdf
    }

    pub(crate) fn resume_pdf(line: &str) -> Vec<u8> {
        one_page_pdf(&format!("BT /F1 12 Tf 72 720 Td ({line}) Tj ET"))
    }

    #[test]
    fn test_from_pdf_extracts_page_text() {
        let bytes = resume_pdf("Jane Doe Rust");
        let doc = ResumeDocument::from_pdf("cv.pdf", Some("application/pdf"), &bytes).unwrap();
        assert_eq!(doc.filename(), "cv.pdf");
        assert!(doc.text().contains("Jane Doe Rust"), "text: {:?}", doc.text());
        assert!(doc.text().ends_with('\n'));
    }

    #[test]
    fn test_pdf_without_text_is_empty() {
        let bytes = one_page_pdf("");
        let err = ResumeDocument::from_pdf("blank.pdf", None, &bytes).unwrap_err();
        assert!(matches!(err, DocumentError::Empty));
    }

    #[test]
    fn test_join_pages_appends_newline_per_page() {
        let pages = vec!["Page one".to_string(), "Page two".to_string()];
        assert_eq!(join_pages(&pages), "Page one\nPage two\n");
        assert_eq!(join_pages(&[]), "");
    }

    #[test]
    fn test_is_pdf_requires_magic_bytes() {
        assert!(is_pdf("resume.pdf", None, b"%PDF-1.7\n..."));
        assert!(is_pdf("resume", Some("application/pdf"), b"%PDF-1.4"));
        assert!(is_pdf("RESUME.PDF", None, b"%PDF-1.4"));
        assert!(!is_pdf("resume.pdf", Some("application/pdf"), b"PK\x03\x04"));
        assert!(!is_pdf("resume.docx", None, b"%PDF-1.4"));
    }

    #[test]
    fn test_non_pdf_upload_is_rejected_before_extraction() {
        let err = ResumeDocument::from_pdf("resume.txt", Some("text/plain"), b"hello").unwrap_err();
        assert!(matches!(err, DocumentError::NotPdf));
    }

    #[test]
    fn test_oversized_upload_is_rejected() {
        let mut bytes = b"%PDF-1.4\n".to_vec();
        bytes.resize(MAX_UPLOAD_BYTES + 1, b' ');
        let err = ResumeDocument::from_pdf("resume.pdf", None, &bytes).unwrap_err();
        assert!(matches!(err, DocumentError::TooLarge { .. }));
    }

    #[test]
    fn test_attachment_marker_uses_filename() {
        let doc = ResumeDocument::new("jane_doe.pdf", "text");
        assert_eq!(doc.attachment_marker(), "[Attached PDF: jane_doe.pdf]");
    }

    #[test]
    fn test_document_errors_map_to_app_errors() {
        assert!(matches!(AppError::from(DocumentError::NotPdf), AppError::Validation(_)));
        assert!(matches!(
            AppError::from(DocumentError::Empty),
            AppError::UnprocessableEntity(_)
        ));
    }
}
