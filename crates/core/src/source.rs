//! Source inputs and the extractor trait.
//!
//! A [`Source`] is what the user attaches to a question: a web page URL or
//! the bytes of an uploaded PDF. A [`SourceExtractor`] turns it into plain
//! text that can be used as grounding content.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ExtractionError;
use crate::message::{SourceKind, SourceRef};

/// An uploaded PDF: its file name plus the raw bytes.
#[derive(Clone)]
pub struct PdfUpload {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl PdfUpload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a PDF from disk. The upload is named after the file's name.
    pub fn read(path: &Path) -> Result<Self, ExtractionError> {
        let bytes = std::fs::read(path).map_err(|e| ExtractionError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }
}

impl std::fmt::Debug for PdfUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfUpload")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// A source of grounding content.
#[derive(Debug, Clone)]
pub enum Source {
    Url(String),
    Pdf(PdfUpload),
}

impl Source {
    pub fn kind(&self) -> SourceKind {
        match self {
            Source::Url(_) => SourceKind::Url,
            Source::Pdf(_) => SourceKind::Pdf,
        }
    }

    /// The URL, or the uploaded file's name.
    pub fn identifier(&self) -> &str {
        match self {
            Source::Url(url) => url,
            Source::Pdf(upload) => &upload.name,
        }
    }

    /// The reference recorded on the user turn.
    pub fn reference(&self) -> SourceRef {
        SourceRef {
            kind: self.kind(),
            id: self.identifier().to_string(),
        }
    }
}

/// Turns a [`Source`] into plain text.
///
/// Implementations must never return `Ok` with an empty string; an empty
/// extraction is [`ExtractionError::Empty`].
#[async_trait]
pub trait SourceExtractor: Send + Sync {
    async fn extract(&self, source: &Source) -> Result<String, ExtractionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_source_reference() {
        let source = Source::Url("https://example.com".into());
        assert_eq!(source.kind(), SourceKind::Url);
        assert_eq!(source.identifier(), "https://example.com");
        assert_eq!(source.reference(), SourceRef::url("https://example.com"));
    }

    #[test]
    fn pdf_source_uses_file_name() {
        let source = Source::Pdf(PdfUpload::new("report.pdf", vec![1u8, 2, 3]));
        assert_eq!(source.kind(), SourceKind::Pdf);
        assert_eq!(source.identifier(), "report.pdf");
    }

    #[test]
    fn read_missing_pdf_is_io_error() {
        let err = PdfUpload::read(Path::new("/nonexistent/file.pdf")).unwrap_err();
        assert!(matches!(err, ExtractionError::Io { .. }));
    }

    #[test]
    fn pdf_debug_hides_bytes() {
        let upload = PdfUpload::new("a.pdf", vec![0u8; 10]);
        let dbg = format!("{upload:?}");
        assert!(dbg.contains("a.pdf"));
        assert!(dbg.contains("10"));
    }
}
