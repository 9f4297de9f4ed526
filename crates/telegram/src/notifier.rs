use std::time::Duration;

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{ChatId, Recipient},
};
use tracing::{debug, info};

use common::{Error, Notifier, Result};

/// Sends signal reports to one Telegram chat or channel.
pub struct TelegramNotifier {
    bot: Bot,
    recipient: Recipient,
}

impl TelegramNotifier {
    /// `chat` is a numeric chat id (`-100123…`) or a channel name (`@channel`).
    /// Requests to the Bot API are bounded by `timeout`.
    pub fn new(token: impl Into<String>, chat: &str, timeout: Duration) -> Result<Self> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Notify(format!("Failed to build Telegram HTTP client: {e}")))?;
        let recipient = parse_recipient(chat)?;
        info!(recipient = ?recipient, "Telegram notifications enabled");
        Ok(Self {
            bot: Bot::with_client(token, client),
            recipient,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn notify(&self, message: &str) -> Result<()> {
        self.bot
            .send_message(self.recipient.clone(), message)
            .await
            .map_err(|e| Error::Notify(e.to_string()))?;
        debug!(recipient = ?self.recipient, "Telegram message sent");
        Ok(())
    }
}

/// Numeric ids become `ChatId`s; anything else is treated as a channel username.
pub fn parse_recipient(chat: &str) -> Result<Recipient> {
    let chat = chat.trim();
    if chat.is_empty() {
        return Err(Error::Config("Telegram chat id is empty".into()));
    }
    if let Ok(id) = chat.parse::<i64>() {
        return Ok(Recipient::Id(ChatId(id)));
    }
    let name = if chat.starts_with('@') {
        chat.to_string()
    } else {
        format!("@{chat}")
    };
    Ok(Recipient::ChannelUsername(name))
}
