//! Plain-text transcript export.

use std::path::Path;

use chrono::{DateTime, Utc};
use sourcechat_core::message::ChatTurn;

/// Render turns as `ROLE: content` blocks separated by blank lines.
pub fn render(turns: &[ChatTurn]) -> String {
    turns
        .iter()
        .map(|turn| {
            format!(
                "{}: {}",
                turn.role.as_str().to_uppercase(),
                turn.display_content()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `chat_history_<unix seconds>.txt`
pub fn default_file_name(now: DateTime<Utc>) -> String {
    format!("chat_history_{}.txt", now.timestamp())
}

pub fn write(turns: &[ChatTurn], path: &Path) -> std::io::Result<()> {
    std::fs::write(path, render(turns))
}
