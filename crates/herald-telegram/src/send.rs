//! Outbound send helper.
//!
//! Telegram caps messages at 4096 characters; long replies (a big `list`)
//! are split at line boundaries and sent as consecutive messages.

use std::time::Duration;

use teloxide::prelude::*;
use tracing::warn;

/// Maximum characters per message (limit is 4096; 4090 leaves headroom).
const CHUNK_MAX: usize = 4090;

/// Split `text` into chunks of at most [`CHUNK_MAX`] characters, breaking
/// at newlines where possible and force-splitting any single oversized line.
pub fn split_chunks(text: &str) -> Vec<String> {
    if text.len() <= CHUNK_MAX {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    for line in text.split('\n') {
        let cost = if current.is_empty() {
            line.len()
        } else {
            1 + line.len()
        };
        if !current.is_empty() && current.len() + cost > CHUNK_MAX {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    // A single line can still exceed the cap; hard-split those.
    let mut result = Vec::new();
    for chunk in chunks {
        if chunk.len() <= CHUNK_MAX {
            result.push(chunk);
            continue;
        }
        let mut remaining = chunk.as_str();
        while remaining.len() > CHUNK_MAX {
            let split_at = remaining[..CHUNK_MAX]
                .rfind(' ')
                .unwrap_or(CHUNK_MAX);
            result.push(remaining[..split_at].to_string());
            remaining = remaining[split_at..].trim_start();
        }
        if !remaining.is_empty() {
            result.push(remaining.to_string());
        }
    }
    result
}

/// Send `text` to `chat_id` as plain text, chunked.
///
/// Failures are logged, not propagated — a lost reply should never take
/// down the webhook handler.
pub async fn send_text(bot: &Bot, chat_id: ChatId, text: &str) {
    let chunks = split_chunks(text);
    let last = chunks.len().saturating_sub(1);
    for (i, chunk) in chunks.into_iter().enumerate() {
        if let Err(e) = bot.send_message(chat_id, chunk).await {
            warn!(error = %e, chat_id = chat_id.0, chunk_index = i, "telegram: send failed");
        }
        if i < last {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_single_chunk() {
        let chunks = split_chunks("Saved reminder #1.");
        assert_eq!(chunks, vec!["Saved reminder #1.".to_string()]);
    }

    #[test]
    fn splits_on_line_boundaries() {
        let line = "x".repeat(2000);
        let text = format!("{line}\n{line}\n{line}");
        let chunks = split_chunks(&text);
        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.len() <= CHUNK_MAX, "chunk too large: {}", c.len());
        }
    }

    #[test]
    fn force_splits_one_giant_line() {
        let text = "y".repeat(9000);
        let chunks = split_chunks(&text);
        assert!(chunks.len() >= 3);
        for c in &chunks {
            assert!(c.len() <= CHUNK_MAX);
        }
    }
}
