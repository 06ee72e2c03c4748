//! Error types for the SourceChat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each stage of a submission has its own error enum; [`SessionError`]
//! is what the orchestrator hands back to the caller.

use thiserror::Error;

/// The error returned by a single submission.
///
/// Every variant is terminal for that submission only. The session stays
/// usable and its history is left exactly as it was before the submission.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Please enter a question.")]
    EmptyQuestion,

    #[error("Failed to process content: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("{0}")]
    Completion(#[from] CompletionError),
}

impl SessionError {
    /// Short machine-readable label, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::EmptyQuestion => "empty_question",
            SessionError::Extraction(e) => e.kind(),
            SessionError::Completion(e) => e.kind(),
        }
    }
}

// --- Stage errors ---

/// Failure to turn a source into text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Error reading PDF: {0}")]
    Pdf(String),

    /// The server answered with a non-2xx status.
    #[error("{detail}")]
    Http { status: u16, detail: String },

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Parse(String),

    /// Extraction succeeded but produced no text at all.
    #[error("No text could be extracted from {0}")]
    Empty(String),

    #[error("Failed to read {path}: {reason}")]
    Io { path: String, reason: String },
}

impl ExtractionError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::Pdf(_) => "extraction_pdf",
            ExtractionError::Http { .. } => "extraction_http",
            ExtractionError::Network(_) => "extraction_network",
            ExtractionError::Parse(_) => "extraction_parse",
            ExtractionError::Empty(_) => "extraction_empty",
            ExtractionError::Io { .. } => "extraction_io",
        }
    }
}

/// Failure of a chat-completion request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompletionError {
    /// The provider could not be reached at all (DNS, refused, timeout).
    #[error("Connection error: Unable to reach the API. Details: {0}")]
    Connection(String),

    #[error("Received empty response from API")]
    Empty,

    /// The provider answered, but not with a usable completion.
    #[error("API Error{}: {detail}", status_suffix(.status))]
    Api { status: Option<u16>, detail: String },
}

impl CompletionError {
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::Connection(_) => "completion_connection",
            CompletionError::Empty => "completion_empty",
            CompletionError::Api { .. } => "completion_api",
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}
