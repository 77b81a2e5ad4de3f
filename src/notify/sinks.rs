use anyhow::Result;
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::NotificationSink;
use crate::live_scores::sports;
use crate::models::Notification;

/// Writes every notification to the tracing log.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, notification: &Notification) -> Result<()> {
        info!(
            match_id = %notification.match_id,
            sport = sports::name_for(notification.sport_id),
            kind = %notification.kind,
            period = %notification.period,
            "\n{}",
            notification.text
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Prints notification blocks to stdout.
pub struct ConsoleSink;

#[async_trait]
impl NotificationSink for ConsoleSink {
    async fn deliver(&self, notification: &Notification) -> Result<()> {
        let mut out = tokio::io::stdout();
        out.write_all(notification.text.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
