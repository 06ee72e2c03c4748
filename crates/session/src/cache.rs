//! Per-session cache of extracted source text.

use std::collections::HashMap;
use std::future::Future;

use sha2::{Digest, Sha256};
use sourcechat_config::CacheKeyMode;
use sourcechat_core::error::ExtractionError;
use sourcechat_core::source::Source;
use tracing::debug;

/// Identity of a cached extraction.
///
/// `fingerprint` is a SHA-256 of the uploaded bytes when PDFs are keyed by
/// content; URLs never carry one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub identifier: String,
    pub fingerprint: Option<String>,
}

impl CacheKey {
    pub fn identifier(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            fingerprint: None,
        }
    }

    pub fn for_source(source: &Source, mode: CacheKeyMode) -> Self {
        match (source, mode) {
            (Source::Pdf(upload), CacheKeyMode::ContentHash) => Self {
                identifier: upload.name.clone(),
                fingerprint: Some(format!("{:x}", Sha256::digest(&upload.bytes))),
            },
            _ => Self::identifier(source.identifier()),
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.fingerprint {
            Some(hash) => write!(f, "{}#{}", self.identifier, &hash[..hash.len().min(12)]),
            None => f.write_str(&self.identifier),
        }
    }
}

/// Whether a lookup was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

/// Extracted text keyed by [`CacheKey`]. Only successful extractions are stored.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: HashMap<CacheKey, String>,
    order: Vec<CacheKey>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached text for `key`, or run `extract` and store its result.
    ///
    /// A failed extraction leaves the cache untouched.
    pub async fn get_or_extract<F, Fut>(
        &mut self,
        key: CacheKey,
        extract: F,
    ) -> Result<(String, CacheOutcome), ExtractionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, ExtractionError>>,
    {
        if let Some(text) = self.entries.get(&key) {
            debug!(key = %key, "Cache hit");
            return Ok((text.clone(), CacheOutcome::Hit));
        }

        debug!(key = %key, "Cache miss");
        let text = extract().await?;
        self.order.push(key.clone());
        self.entries.insert(key, text.clone());
        Ok((text, CacheOutcome::Miss))
    }

    /// Whether any entry was stored under this URL or file name.
    pub fn contains_identifier(&self, identifier: &str) -> bool {
        self.order.iter().any(|k| k.identifier == identifier)
    }

    /// Distinct identifiers in insertion order.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for key in &self.order {
            if !seen.contains(&key.identifier.as_str()) {
                seen.push(&key.identifier);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
