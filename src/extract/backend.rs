//! Extraction backends

use super::{non_blank, ExtractionError, TextExtractor};

/// Pure-Rust backend: lopdf for structure, pdf-extract for the text layer
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractBackend;

impl TextExtractor for PdfExtractBackend {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, data: &[u8]) -> Result<Option<String>, ExtractionError> {
        // Parse once with lopdf so unreadable files fail loudly and
        // zero-page documents short-circuit before text extraction
        let document = lopdf::Document::load_mem(data)?;
        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Ok(None);
        }

        let text = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| ExtractionError::Backend(e.to_string()))?;

        tracing::trace!(page_count, "pdf-extract finished");
        Ok(non_blank(text))
    }
}

/// MuPDF backend, page by page through the structured text API
#[cfg(feature = "mupdf-extract")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MupdfBackend;

#[cfg(feature = "mupdf-extract")]
impl From<mupdf::Error> for ExtractionError {
    fn from(err: mupdf::Error) -> Self {
        ExtractionError::Malformed(err.to_string())
    }
}

#[cfg(feature = "mupdf-extract")]
impl TextExtractor for MupdfBackend {
    fn name(&self) -> &'static str {
        "mupdf"
    }

    fn extract(&self, data: &[u8]) -> Result<Option<String>, ExtractionError> {
        let doc = mupdf::Document::from_bytes(data, "application/pdf")?;
        let page_count = doc.page_count()?;
        if page_count == 0 {
            return Ok(None);
        }

        let mut text = String::new();
        for i in 0..page_count {
            let page = doc.load_page(i)?;
            let text_page = page.to_text_page(mupdf::TextPageOptions::empty())?;
            text.push_str(&text_page.to_text()?);
            text.push('\n');
        }

        Ok(non_blank(text))
    }
}
