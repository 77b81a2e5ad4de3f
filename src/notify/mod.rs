pub mod sinks;
pub mod telegram;

pub use sinks::{ConsoleSink, LogSink};
pub use telegram::TelegramSink;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

use crate::live_scores::sports;
use crate::models::{Match, Notification, NotificationKind};

/// Destination for match notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<()>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Fans a notification out to every configured sink.
#[derive(Clone)]
pub struct Notifier {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl Notifier {
    pub fn new(sinks: Vec<Arc<dyn NotificationSink>>) -> Self {
        Notifier { sinks }
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Deliver to all sinks in order. A failing sink is logged and skipped.
    /// Returns the number of sinks that failed.
    pub async fn dispatch(&self, notification: &Notification) -> usize {
        let mut failures = 0;
        for sink in &self.sinks {
            if let Err(e) = sink.deliver(notification).await {
                failures += 1;
                warn!(
                    "Sink '{}' failed to deliver {} for match {}: {:#}",
                    sink.name(),
                    notification.kind,
                    notification.match_id,
                    e
                );
            }
        }
        failures
    }
}

/// Build the notification for a match that is new or has changed.
pub fn build_notification(kind: NotificationKind, m: &Match) -> Notification {
    let period = sports::derive_period(m, m.sport_id);
    let header = match kind {
        NotificationKind::New => "🆕 New match",
        NotificationKind::Update => "🔄 Match update",
    };
    let text = format!("{}\n{}", header, format_match(m, &period));
    Notification {
        kind,
        sport_id: m.sport_id,
        match_id: m.id.clone(),
        period,
        text,
        detected_at: Utc::now(),
    }
}

/// Three-line match block: league, teams and score, clock and period.
pub fn format_match(m: &Match, period: &str) -> String {
    format!(
        "{}\n{} {} {} {}\n⏰ {}' ({})\n",
        m.league,
        sports::emoji_for(m.sport_id),
        m.home,
        m.score_display(),
        m.away,
        m.elapsed(),
        period
    )
}


#[cfg(test)]
mod tests {
    use super::testing::{FailingSink, RecordingSink};
    use super::*;
    use crate::models::MatchTimer;

    fn soccer_match() -> Match {
        Match {
            id: "12345".into(),
            sport_id: 1,
            league: "England Premier League".into(),
            home: "Arsenal".into(),
            away: "Chelsea".into(),
            score: Some("1-0".into()),
            live: true,
            timer: MatchTimer {
                minute: Some("23".into()),
                ..MatchTimer::default()
            },
        }
    }

    #[test]
    fn test_notification_text_layout() {
        let n = build_notification(NotificationKind::New, &soccer_match());
        assert_eq!(
            n.text,
            "🆕 New match\nEngland Premier League\n⚽ Arsenal 1-0 Chelsea\n⏰ 23' (1H)\n"
        );
        assert_eq!(n.period, "1H");
        assert_eq!(n.match_id, "12345");
    }

    #[test]
    fn test_notification_placeholders() {
        let mut m = soccer_match();
        m.score = None;
        m.timer.minute = None;
        m.live = false;
        let n = build_notification(NotificationKind::Update, &m);
        assert!(n.text.starts_with("🔄 Match update\n"));
        assert!(n.text.contains("Arsenal vs Chelsea"));
        assert!(n.text.contains("⏰ 0' (-)"));
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_block_others() {
        let recorder = Arc::new(RecordingSink::default());
        let sinks: Vec<Arc<dyn NotificationSink>> = vec![
            Arc::new(FailingSink),
            recorder.clone() as Arc<dyn NotificationSink>,
            Arc::new(FailingSink),
        ];
        let notifier = Notifier::new(sinks);

        let n = build_notification(NotificationKind::New, &soccer_match());
        assert_eq!(notifier.dispatch(&n).await, 2);
        assert_eq!(recorder.delivered.lock().await.len(), 1);
    }
}
