//! Web page fetching and visible-text cleanup.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use sourcechat_config::HttpConfig;
use sourcechat_core::error::ExtractionError;
use tracing::{debug, warn};

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>").unwrap()
});
static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[A-Za-z/!?][^>]*>").unwrap());
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

/// Fetches a URL and reduces the page to its visible text.
#[derive(Debug, Clone)]
pub struct WebExtractor {
    client: reqwest::Client,
}

impl WebExtractor {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ExtractionError::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn from_config(http: &HttpConfig) -> Result<Self, ExtractionError> {
        Self::new(Duration::from_secs(http.fetch_timeout_secs), &http.user_agent)
    }

    pub async fn extract(&self, url: &str) -> Result<String, ExtractionError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ExtractionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let class = if status.is_client_error() {
                "Client Error"
            } else {
                "Server Error"
            };
            let detail = format!(
                "{} {class}: {} for url: {url}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
            );
            warn!(status = status.as_u16(), %url, "Source fetch failed");
            return Err(ExtractionError::Http {
                status: status.as_u16(),
                detail,
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;

        debug!(%url, bytes = html.len(), "Page fetched");

        Ok(visible_text(&html))
    }
}

/// Strip markup from `html` and collapse the remaining text.
///
/// Script, style and comment blocks are dropped entirely; other tags are
/// removed without adding separators. Each line is trimmed and split on
/// double spaces, and the non-empty fragments are joined with single spaces.
pub fn visible_text(html: &str) -> String {
    let text = SCRIPT_OR_STYLE.replace_all(html, "");
    let text = COMMENT.replace_all(&text, "");
    let text = TAG.replace_all(&text, "");
    let text = decode_entities(&text);
    collapse_whitespace(&text)
}

fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
