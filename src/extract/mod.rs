//! PDF Text Extraction
//!
//! Turns uploaded PDF bytes into plain text. Three outcomes are kept apart:
//!
//! - `Ok(Some(text))`: the document has extractable text
//! - `Ok(None)`: the document is empty or image-only (scanned)
//! - `Err(_)`: the bytes are not a readable PDF
//!
//! Backends:
//! - `pdf-extract` (default, pure Rust)
//! - MuPDF (`mupdf-extract` feature)

mod backend;

use std::sync::Arc;

pub use backend::PdfExtractBackend;
#[cfg(feature = "mupdf-extract")]
pub use backend::MupdfBackend;

/// Extraction error types
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("File is not a PDF document")]
    NotPdf,

    #[error("Malformed PDF: {0}")]
    Malformed(String),

    #[error("Text extraction failed: {0}")]
    Backend(String),
}

impl From<lopdf::Error> for ExtractionError {
    fn from(err: lopdf::Error) -> Self {
        ExtractionError::Malformed(err.to_string())
    }
}

/// Text extraction backend
///
/// Implementations are synchronous and CPU-bound; callers go through
/// [`extract_text`], which runs them on the blocking pool.
pub trait TextExtractor: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Extract all text, `None` when the document carries none
    fn extract(&self, data: &[u8]) -> Result<Option<String>, ExtractionError>;
}

/// Whether the buffer starts like a PDF (`%PDF-` within the first KiB)
pub fn looks_like_pdf(data: &[u8]) -> bool {
    let head = &data[..data.len().min(1024)];
    head.windows(5).any(|w| w == b"%PDF-")
}

/// Trim the extracted text, mapping blank output to `None`
pub(crate) fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == text.len() {
        Some(text)
    } else {
        Some(trimmed.to_string())
    }
}

/// Run an extractor on the blocking pool
///
/// A panic inside the backend is reported as a malformed document rather
/// than taking the request down.
pub async fn extract_text(
    extractor: Arc<dyn TextExtractor>,
    data: Vec<u8>,
) -> Result<Option<String>, ExtractionError> {
    if !looks_like_pdf(&data) {
        return Err(ExtractionError::NotPdf);
    }

    let backend = extractor.name();
    let size = data.len();

    let result = tokio::task::spawn_blocking(move || extractor.extract(&data))
        .await
        .map_err(|e| {
            if e.is_panic() {
                ExtractionError::Malformed(format!("{} backend panicked", backend))
            } else {
                ExtractionError::Backend(format!("Task join error: {}", e))
            }
        })?;

    match &result {
        Ok(Some(text)) => {
            tracing::debug!(backend, bytes = size, chars = text.chars().count(), "Extracted PDF text");
        }
        Ok(None) => {
            tracing::warn!(backend, bytes = size, "No text extracted from PDF (empty, scanned or image-based)");
        }
        Err(e) => {
            tracing::error!(backend, bytes = size, error = %e, "Error extracting text from PDF");
        }
    }

    result
}
