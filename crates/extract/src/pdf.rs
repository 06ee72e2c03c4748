//! PDF text extraction.
//!
//! Parsing is CPU-bound, so it runs on tokio's blocking pool.

use sourcechat_core::error::ExtractionError;
use sourcechat_core::source::PdfUpload;
use tracing::debug;

/// Extracts the text of every page of an uploaded PDF.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Page texts in document order, each followed by a newline.
    pub async fn extract(&self, upload: &PdfUpload) -> Result<String, ExtractionError> {
        let bytes = upload.bytes.clone();
        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        })
        .await
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

        debug!(name = %upload.name, pages = pages.len(), "PDF parsed");

        Ok(join_pages(&pages))
    }
}

fn join_pages(pages: &[String]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page);
        text.push('\n');
    }
    text
}
