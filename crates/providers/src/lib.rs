//! Chat-completion provider implementations for SourceChat.
//!
//! All providers implement the `sourcechat_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
