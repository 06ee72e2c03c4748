//! Text extraction for SourceChat.
//!
//! Turns a [`Source`] into bounded plain text:
//! - [`PdfExtractor`] reads page text from uploaded PDF bytes
//! - [`WebExtractor`] fetches a URL and strips the markup
//! - [`truncate_text`] bounds the result at a sentence boundary
//!
//! [`DocumentExtractor`] ties them together behind the
//! `sourcechat_core::SourceExtractor` trait.

pub mod pdf;
pub mod truncate;
pub mod web;

pub use pdf::PdfExtractor;
pub use truncate::{DEFAULT_MAX_CHARS, truncate_text};
pub use web::{WebExtractor, visible_text};

use async_trait::async_trait;
use sourcechat_config::AppConfig;
use sourcechat_core::error::ExtractionError;
use sourcechat_core::source::{Source, SourceExtractor};
use tracing::{debug, info};

/// Routes each source to the matching extractor and truncates the result.
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    web: WebExtractor,
    pdf: PdfExtractor,
    max_chars: usize,
}

impl DocumentExtractor {
    pub fn new(web: WebExtractor, max_chars: usize) -> Self {
        Self {
            web,
            pdf: PdfExtractor::new(),
            max_chars,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ExtractionError> {
        Ok(Self::new(
            WebExtractor::from_config(&config.http)?,
            config.context.max_chars,
        ))
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }
}

#[async_trait]
impl SourceExtractor for DocumentExtractor {
    async fn extract(&self, source: &Source) -> Result<String, ExtractionError> {
        debug!(kind = %source.kind(), id = %source.identifier(), "Extracting source");

        let text = match source {
            Source::Url(url) => self.web.extract(url).await?,
            Source::Pdf(upload) => self.pdf.extract(upload).await?,
        };

        if text.trim().is_empty() {
            return Err(ExtractionError::Empty(source.identifier().to_string()));
        }

        let bounded = truncate_text(&text, self.max_chars);
        info!(
            kind = %source.kind(),
            id = %source.identifier(),
            chars = bounded.chars().count(),
            truncated = bounded.len() < text.len(),
            "Source extracted"
        );
        Ok(bounded.to_string())
    }
}
