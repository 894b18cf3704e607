use async_trait::async_trait;
use chrono::Utc;
use teloxide::prelude::*;

use common::{Alert, Error, Result, SignalSink};

use crate::format::format_alert;

/// Delivers alerts to one Telegram chat.
pub struct TelegramSink {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramSink {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl SignalSink for TelegramSink {
    fn describe(&self) -> String {
        format!("telegram:{}", self.chat_id.0)
    }

    async fn publish(&self, symbol: &str, alert: &Alert) -> Result<()> {
        let text = format_alert(symbol, alert, Utc::now());
        self.bot
            .send_message(self.chat_id, text)
            .await
            .map_err(|e| Error::Sink(format!("chat {}: {e}", self.chat_id.0)))?;
        Ok(())
    }
}
