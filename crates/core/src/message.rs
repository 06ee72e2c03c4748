//! Chat turn and model message domain types.
//!
//! These are the value objects that flow through a submission:
//! user asks → turn is appended → grounding text is resolved → the
//! formatter produces [`ModelMessage`]s → the provider answers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SOURCE_PREFIX: &str = "Source:";
const QUESTION_PREFIX: &str = "Question:";

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// The fixed instruction message that heads every request
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of source a question was asked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Url,
    Pdf,
}

impl SourceKind {
    /// Upper-case label used in the `Source: <KIND> - <id>` display line.
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Url => "URL",
            SourceKind::Pdf => "PDF",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The identity of the source attached to a user question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub kind: SourceKind,
    /// The URL, or the uploaded file's name.
    pub id: String,
}

impl SourceRef {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Url,
            id: url.into(),
        }
    }

    pub fn pdf(name: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Pdf,
            id: name.into(),
        }
    }
}

impl std::fmt::Display for SourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.kind.label(), self.id)
    }
}

/// A single turn in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Unique turn ID
    pub id: String,

    /// Who authored this turn
    pub role: Role,

    /// The literal question (user) or reply (assistant)
    pub content: String,

    /// Source the question was asked against, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    fn new(role: Role, content: impl Into<String>, source: Option<SourceRef>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            source,
            timestamp: Utc::now(),
        }
    }

    /// Create a plain user question.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, None)
    }

    /// Create a user question asked against a source.
    pub fn user_with_source(content: impl Into<String>, source: SourceRef) -> Self {
        Self::new(Role::User, content, Some(source))
    }

    /// Create an assistant reply.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, None)
    }

    /// The content as shown to a human (chat display and transcript export).
    ///
    /// Questions with a source use the two-line form
    /// `Source: <KIND> - <id>` / `Question: <text>`.
    pub fn display_content(&self) -> String {
        match &self.source {
            Some(source) => format!("{SOURCE_PREFIX} {source}\n{QUESTION_PREFIX} {}", self.content),
            None => self.content.clone(),
        }
    }

    /// The question text this turn carries, stripped of any source framing.
    ///
    /// Structured turns return `content` as-is. Turns whose content uses the
    /// two-line `Source:` / `Question:` text form (transcripts written by
    /// older clients) yield only the question line; the source line and any
    /// embedded text after it are dropped.
    pub fn question_text(&self) -> &str {
        if self.source.is_some() {
            return &self.content;
        }
        parse_framed_question(&self.content).unwrap_or(&self.content)
    }
}

/// Extract the question from `Source: ...\nQuestion: ...` framed text.
///
/// Returns `None` when the text does not carry both markers.
pub fn parse_framed_question(content: &str) -> Option<&str> {
    if !content.contains(SOURCE_PREFIX) || !content.contains(QUESTION_PREFIX) {
        return None;
    }
    let line = content.lines().nth(1)?;
    let line = line.trim();
    Some(
        line.strip_prefix(QUESTION_PREFIX)
            .map(str::trim)
            .unwrap_or(line),
    )
}

/// The minimal `{role, content}` pair sent to the completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMessage {
    pub role: Role,
    pub content: String,
}

impl ModelMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
