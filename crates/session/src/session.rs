//! The submission orchestrator.
//!
//! One [`Session`] owns a conversation: its history, its content cache,
//! and handles to the completion provider and source extractor.

use std::sync::Arc;

use sourcechat_config::{AppConfig, CacheKeyMode, DEFAULT_SYSTEM_PROMPT};
use sourcechat_core::error::SessionError;
use sourcechat_core::message::{ChatTurn, SourceRef};
use sourcechat_core::provider::{CompletionRequest, Provider, Usage};
use sourcechat_core::source::{PdfUpload, Source, SourceExtractor};
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, CacheOutcome, ContentCache};
use crate::formatter::build_messages;
use crate::history::ConversationHistory;
use crate::transcript;

/// Model and prompt settings for a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub cache_key: CacheKeyMode,
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.provider.model.clone(),
            temperature: config.provider.temperature as f32,
            max_tokens: config.provider.max_tokens,
            system_prompt: config.context.system_prompt.clone(),
            cache_key: config.context.cache_key,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            model: "deepseek-chat".into(),
            temperature: 0.7,
            max_tokens: 2000,
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            cache_key: CacheKeyMode::default(),
        }
    }
}

/// A question, optionally asked against a URL or an uploaded PDF.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub question: String,
    pub url: Option<String>,
    pub pdf: Option<PdfUpload>,
}

impl Submission {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_pdf(mut self, upload: PdfUpload) -> Self {
        self.pdf = Some(upload);
        self
    }

    /// The source to ground on. A non-blank URL takes precedence over a PDF.
    pub fn source(&self) -> Option<Source> {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Some(Source::Url(url.to_string())),
            _ => self.pdf.clone().map(Source::Pdf),
        }
    }
}

/// A successful answer.
#[derive(Debug, Clone)]
pub struct Reply {
    pub answer: String,
    pub model: String,
    /// The source the answer was grounded on
    pub source: Option<SourceRef>,
    /// How the grounding content was obtained, when there was a source
    pub cache: Option<CacheOutcome>,
    pub usage: Option<Usage>,
}

/// Stage of a submission, reported in log fields.
#[derive(Debug, Clone, Copy)]
enum Phase {
    Resolving,
    Calling,
}

/// One conversation with its history and content cache.
///
/// `submit` takes `&mut self`, so a session runs one submission at a time.
pub struct Session {
    id: String,
    provider: Arc<dyn Provider>,
    extractor: Arc<dyn SourceExtractor>,
    settings: SessionSettings,
    history: ConversationHistory,
    cache: ContentCache,
}

impl Session {
    pub fn new(
        provider: Arc<dyn Provider>,
        extractor: Arc<dyn SourceExtractor>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            provider,
            extractor,
            settings,
            history: ConversationHistory::new(),
            cache: ContentCache::new(),
        }
    }

    /// Ask a question.
    ///
    /// On any failure the user turn is rolled back, so the history is
    /// exactly what it was before the call.
    pub async fn submit(&mut self, submission: Submission) -> Result<Reply, SessionError> {
        let question = submission.question.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }

        let source = submission.source();
        let turn = match &source {
            Some(source) => ChatTurn::user_with_source(question, source.reference()),
            None => ChatTurn::user(question),
        };
        self.history.append(turn);

        let source_label = source
            .as_ref()
            .map_or_else(|| "none".to_string(), |s| s.reference().to_string());
        info!(
            session = %self.id,
            turns = self.history.len(),
            source = %source_label,
            "Processing submission"
        );

        let result = self.answer(question, source.as_ref()).await;

        if let Err(e) = &result {
            self.history.rollback_last();
            warn!(session = %self.id, kind = e.kind(), error = %e, "Submission failed, rolled back");
        }
        result
    }

    async fn answer(
        &mut self,
        question: &str,
        source: Option<&Source>,
    ) -> Result<Reply, SessionError> {
        let (content, cache) = match source {
            Some(source) => {
                let key = CacheKey::for_source(source, self.settings.cache_key);
                debug!(
                    session = %self.id,
                    phase = ?Phase::Resolving,
                    key = %key,
                    "Resolving source"
                );
                let extractor = &self.extractor;
                let (text, outcome) = self
                    .cache
                    .get_or_extract(key, || extractor.extract(source))
                    .await?;
                (Some(text), Some(outcome))
            }
            None => (None, None),
        };

        let prior = &self.history.turns()[..self.history.len().saturating_sub(1)];
        let messages = build_messages(
            &self.settings.system_prompt,
            prior,
            question,
            content.as_deref(),
        );

        debug!(
            session = %self.id,
            provider = self.provider.name(),
            messages = messages.len(),
            grounded = content.is_some(),
            phase = ?Phase::Calling,
            "Requesting completion"
        );

        let request = CompletionRequest::new(self.settings.model.clone(), messages)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);
        let completion = self.provider.complete(request).await?;

        if let Some(usage) = &completion.usage {
            debug!(
                session = %self.id,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Token usage"
            );
        }

        self.history.append(ChatTurn::assistant(&completion.content));

        Ok(Reply {
            answer: completion.content,
            model: completion.model,
            source: source.map(Source::reference),
            cache,
            usage: completion.usage,
        })
    }

    /// Start over: clears the history and the content cache together.
    pub fn reset(&mut self) {
        info!(
            session = %self.id,
            turns = self.history.len(),
            cached = self.cache.len(),
            "Session reset"
        );
        self.history.clear();
        self.cache.clear();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub fn transcript(&self) -> String {
        transcript::render(self.history.turns())
    }
}
