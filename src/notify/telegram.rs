use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::NotificationSink;
use crate::models::Notification;

/// Delivers notifications as Telegram bot messages.
pub struct TelegramSink {
    http: Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramSink {
    pub fn new(api_url: &str, bot_token: &str, chat_id: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(TelegramSink {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }

    async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.bot_token);
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Telegram request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Telegram sendMessage failed: {} {}", status, body);
        }

        let reply: serde_json::Value = resp
            .json()
            .await
            .context("Failed to parse Telegram response")?;
        if reply["ok"].as_bool() != Some(true) {
            anyhow::bail!(
                "Telegram rejected message: {}",
                reply["description"].as_str().unwrap_or("no description")
            );
        }
        debug!(
            "Telegram message {} sent to chat {}",
            reply["result"]["message_id"], self.chat_id
        );
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    async fn deliver(&self, notification: &Notification) -> Result<()> {
        self.send_message(&notification.text).await
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
