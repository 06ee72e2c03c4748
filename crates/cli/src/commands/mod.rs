//! Subcommand implementations and the setup they share.

pub mod ask;
pub mod chat;
pub mod doctor;
pub mod onboard;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sourcechat_config::AppConfig;
use sourcechat_core::error::ExtractionError;
use sourcechat_core::source::{PdfUpload, Source};
use sourcechat_extract::DocumentExtractor;
use sourcechat_providers::OpenAiCompatProvider;
use sourcechat_session::{Reply, Session, SessionSettings, Submission};

pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load(path).map_err(|e| format!("Failed to load config: {e}"))?)
}

/// The config file in use: `--config` when given, else the default location.
pub fn config_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::default_path)
}

/// The source named by `--url` / `--pdf`.
///
/// A non-blank URL wins, and the PDF is then never read from disk.
pub fn source_from_args(
    url: Option<String>,
    pdf: Option<&Path>,
) -> Result<Option<Source>, ExtractionError> {
    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
        return Ok(Some(Source::Url(url)));
    }
    pdf.map(|path| PdfUpload::read(path).map(Source::Pdf))
        .transpose()
}

pub fn submission_for(question: String, source: Option<&Source>) -> Submission {
    match source {
        Some(Source::Url(url)) => Submission::new(question).with_url(url.clone()),
        Some(Source::Pdf(upload)) => Submission::new(question).with_pdf(upload.clone()),
        None => Submission::new(question),
    }
}

pub fn build_session(
    config: &AppConfig,
    api_key: &str,
) -> Result<Session, Box<dyn std::error::Error>> {
    let provider = OpenAiCompatProvider::from_config(&config.provider, &config.http, api_key)?;
    let extractor = DocumentExtractor::from_config(config)?;
    Ok(Session::new(
        Arc::new(provider),
        Arc::new(extractor),
        SessionSettings::from_config(config),
    ))
}

pub fn print_missing_key(config_path: &Path) {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables (or put it in a .env file):");
    eprintln!("    DEEPSEEK_API_KEY=sk-...");
    eprintln!("    SOURCECHAT_API_KEY=sk-...   (any OpenAI-compatible provider)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", config_path.display());
    eprintln!();
    eprintln!("  Get a DeepSeek key at: https://platform.deepseek.com/api_keys");
    eprintln!();
}

pub fn print_reply(reply: &Reply) {
    println!();
    for line in reply.answer.lines() {
        println!("  Assistant > {line}");
    }
    println!();
}
