//! # SourceChat Core
//!
//! Domain types, traits, and error definitions for SourceChat, a chat
//! assistant that grounds questions in an attached web page or PDF.
//! This crate has **no network dependencies** — it defines the domain model
//! that the other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two outbound seams are traits defined here:
//! - [`Provider`] — sends a message list to a chat-completion backend
//! - [`SourceExtractor`] — turns a [`Source`] into plain text
//!
//! Implementations live in `sourcechat-providers` and `sourcechat-extract`,
//! which keeps the session logic testable with in-process mocks.

pub mod error;
pub mod message;
pub mod provider;
pub mod source;

// Re-export key types at crate root for ergonomics
pub use error::{CompletionError, ExtractionError, SessionError};
pub use message::{ChatTurn, ModelMessage, Role, SourceKind, SourceRef};
pub use provider::{Completion, CompletionRequest, Provider, Usage};
pub use source::{PdfUpload, Source, SourceExtractor};
