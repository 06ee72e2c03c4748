//! `sourcechat chat` — Interactive chat with an optional attached source.

use std::io::Write;
use std::path::{Path, PathBuf};

use sourcechat_config::{AppConfig, is_usable_key};
use sourcechat_core::source::{PdfUpload, Source};
use sourcechat_session::{Session, transcript};

use super::{build_session, load_config, print_reply, source_from_args, submission_for};
use crate::input::stdin_lines;
use crate::repl::{self, HELP, ReplCommand};

pub async fn run(
    config_file: Option<&Path>,
    url: Option<String>,
    pdf: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_file)?;

    let api_key = match config.api_key.clone() {
        Some(key) => key,
        None => prompt_api_key()?,
    };

    let mut session = build_session(&config, &api_key)?;

    let mut attached = source_from_args(url, pdf.as_deref())?;

    print_banner(&config, attached.as_ref());

    let mut rx = stdin_lines();

    prompt()?;
    while let Some(line) = rx.recv().await {
        let Some(command) = repl::parse(&line) else {
            prompt()?;
            continue;
        };

        match command {
            ReplCommand::Exit => break,
            ReplCommand::Ask(question) => ask(&mut session, question, attached.as_ref()).await,
            ReplCommand::AttachUrl(url) => {
                println!("  Attached URL: {url}");
                attached = Some(Source::Url(url));
            }
            ReplCommand::AttachPdf(path) => match PdfUpload::read(&path) {
                Ok(upload) => {
                    println!("  Attached PDF: {} ({} bytes)", upload.name, upload.bytes.len());
                    attached = Some(Source::Pdf(upload));
                }
                Err(e) => eprintln!("  [Error] {e}"),
            },
            ReplCommand::Detach => {
                attached = None;
                println!("  No source attached.");
            }
            ReplCommand::Sources => print_sources(&session),
            ReplCommand::History => print_history(&session),
            ReplCommand::Export(path) => export(&session, path),
            ReplCommand::Clear => {
                session.reset();
                println!("  Conversation and cached sources cleared.");
            }
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::MissingArgument(usage) => eprintln!("  Usage: {usage}"),
            ReplCommand::Unknown(input) => {
                eprintln!("  Unknown command: {input} (type /help for commands)")
            }
        }

        prompt()?;
    }

    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

/// Ask for a key on the terminal. It is kept for this session only.
fn prompt_api_key() -> Result<String, Box<dyn std::error::Error>> {
    eprintln!();
    eprintln!("  No API key found in config, environment, or .env.");
    let key = dialoguer::Password::new()
        .with_prompt("  DeepSeek API key")
        .interact()?;
    if !is_usable_key(&key) {
        return Err("An API key is required to chat.".into());
    }
    Ok(key)
}

fn print_banner(config: &AppConfig, attached: Option<&Source>) {
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        SourceChat — Interactive Mode         ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.provider.name);
    println!("  Model:     {}", config.provider.model);
    match attached {
        Some(source) => println!("  Source:    {}", source.reference()),
        None => println!("  Source:    none (attach one with /url or /pdf)"),
    }
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type /help for commands, 'exit' or Ctrl+C to quit.");
    println!();
}

async fn ask(session: &mut Session, question: String, attached: Option<&Source>) {
    let submission = submission_for(question, attached);

    eprint!("  ...");
    let result = session.submit(submission).await;
    eprint!("\r     \r");

    match result {
        Ok(reply) => print_reply(&reply),
        Err(e) => {
            eprintln!("  [Error] {e}");
            println!();
        }
    }
}

fn print_sources(session: &Session) {
    let identifiers = session.cache().identifiers();
    if identifiers.is_empty() {
        println!("  No sources extracted yet.");
        return;
    }
    for id in identifiers {
        println!("  - {id}");
    }
}

fn print_history(session: &Session) {
    if session.history().is_empty() {
        println!("  No messages yet.");
        return;
    }
    println!();
    println!("{}", session.transcript());
    println!();
}

fn export(session: &Session, path: Option<PathBuf>) {
    let path =
        path.unwrap_or_else(|| PathBuf::from(transcript::default_file_name(chrono::Utc::now())));
    match transcript::write(session.history().turns(), &path) {
        Ok(()) => println!("  Saved conversation to {}", path.display()),
        Err(e) => eprintln!("  [Error] Failed to write {}: {e}", path.display()),
    }
}
