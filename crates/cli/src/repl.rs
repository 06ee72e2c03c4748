//! Interactive command parsing.

use std::path::PathBuf;

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Ask(String),
    AttachUrl(String),
    AttachPdf(PathBuf),
    Detach,
    Sources,
    History,
    Export(Option<PathBuf>),
    Clear,
    Help,
    Exit,
    /// A known command used without its argument
    MissingArgument(&'static str),
    Unknown(String),
}

pub const HELP: &str = "\
  /url <url>       Ground questions in a web page
  /pdf <path>      Ground questions in a PDF file
  /detach          Stop grounding questions in a source
  /sources         List sources extracted this session
  /history         Show the conversation
  /export [path]   Save the conversation to a text file
  /clear           Forget the conversation and extracted sources
  /help            Show this help
  /exit            Quit (also: exit, quit, :q)";

pub fn parse(line: &str) -> Option<ReplCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if matches!(line, "exit" | "quit" | ":q") {
        return Some(ReplCommand::Exit);
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Some(ReplCommand::Ask(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match (name, arg) {
        ("url", "") => ReplCommand::MissingArgument("/url <url>"),
        ("url", url) => ReplCommand::AttachUrl(url.to_string()),
        ("pdf", "") => ReplCommand::MissingArgument("/pdf <path>"),
        ("pdf", path) => ReplCommand::AttachPdf(PathBuf::from(path)),
        ("detach", _) => ReplCommand::Detach,
        ("sources", _) => ReplCommand::Sources,
        ("history", _) => ReplCommand::History,
        ("export", "") => ReplCommand::Export(None),
        ("export", path) => ReplCommand::Export(Some(PathBuf::from(path))),
        ("clear", _) => ReplCommand::Clear,
        ("help" | "?", _) => ReplCommand::Help,
        ("exit" | "quit", _) => ReplCommand::Exit,
        _ => ReplCommand::Unknown(line.to_string()),
    };
    Some(command)
}
