//! The production `MessageTransport` over the Telegram Bot API.

use async_trait::async_trait;
use teloxide::prelude::*;

use herald_sweep::{MessageTransport, TransportError};

/// Pushes reminder notifications through a teloxide [`Bot`].
///
/// Recipients arrive as strings (chat ids stored as text); anything that
/// does not parse into a chat id is a transport rejection, reported per
/// pair like any other delivery failure.
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MessageTransport for TelegramSender {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), TransportError> {
        let chat_id: i64 = recipient
            .parse()
            .map_err(|_| TransportError(format!("not a chat id: {recipient}")))?;
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(())
    }
}
