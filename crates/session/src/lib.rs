//! Conversation sessions for SourceChat.
//!
//! A [`Session`] takes a question (optionally with a URL or PDF), resolves
//! grounding text through its [`ContentCache`], assembles the model
//! messages, and records the exchange in its [`ConversationHistory`].

pub mod cache;
pub mod formatter;
pub mod history;
pub mod session;
pub mod transcript;

pub use cache::{CacheKey, CacheOutcome, ContentCache};
pub use formatter::{build_messages, format_for_model};
pub use history::ConversationHistory;
pub use session::{Reply, Session, SessionSettings, Submission};
