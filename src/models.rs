use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw timer sub-fields reported by the in-play feed.
///
/// The provider mixes strings and numbers for these, so everything is kept as
/// the string form of whatever was sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTimer {
    /// Elapsed minutes (`tm`)
    pub minute: Option<String>,
    /// Elapsed seconds within the minute (`ts`)
    pub second: Option<String>,
    /// Whether the clock is ticking (`tt`)
    pub ticking: Option<String>,
    /// Added / stoppage time (`ta`)
    pub added: Option<String>,
    /// Basketball quarter (`q`)
    pub quarter: Option<String>,
    /// Ice hockey period (`p`)
    pub period: Option<String>,
    /// Volleyball set (`set`)
    pub set: Option<String>,
}

/// One live event as seen in a single poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Provider event ID (numeric IDs are stringified)
    pub id: String,
    pub sport_id: u32,
    pub league: String,
    pub home: String,
    pub away: String,
    /// Composite score string (`ss`), sport specific, e.g. "2-1" or "6-4,3-6,2-1"
    pub score: Option<String>,
    /// `time_status == "1"`
    pub live: bool,
    pub timer: MatchTimer,
}

impl Match {
    /// Elapsed time as shown to users; "0" when the feed sent nothing.
    pub fn elapsed(&self) -> &str {
        self.timer.minute.as_deref().unwrap_or("0")
    }

    /// Score for display; "vs" before the first score is published.
    pub fn score_display(&self) -> &str {
        self.score.as_deref().filter(|s| !s.is_empty()).unwrap_or("vs")
    }

    pub fn state(&self) -> MatchState {
        MatchState {
            score: self
                .score
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "No score".to_string()),
            time: self.elapsed().to_string(),
        }
    }
}

/// The comparable snapshot used to decide whether a match changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchState {
    pub score: String,
    pub time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    New,
    Update,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::New => f.write_str("new"),
            NotificationKind::Update => f.write_str("update"),
        }
    }
}

/// A formatted change notification, ready for delivery to sinks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub sport_id: u32,
    pub match_id: String,
    /// Derived period label ("1H", "Q3", "Set 2", ...)
    pub period: String,
    /// Multi-line text block delivered verbatim to every sink
    pub text: String,
    pub detected_at: DateTime<Utc>,
}
