//! Line input for interactive mode.
//!
//! Reads stdin on a background task and forwards trimmed, non-empty lines.
//! The receiver closes at end of input.

use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        let mut lines = BufReader::new(io::stdin()).lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("stdin read failed: {e}");
                    break;
                }
            }
        }
    });

    rx
}
