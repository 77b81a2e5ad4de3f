use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::live_scores::{sports, PollerConfig};

/// In-play sports monitor
#[derive(Parser, Debug, Clone)]
#[command(name = "inplay-monitor", version, about)]
pub struct Config {
    /// In-play odds API token
    #[arg(long, env = "SPORTS_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// In-play odds API host (bare host or full URL)
    #[arg(long, env = "SPORTS_API_HOST", default_value = "api.b365api.com")]
    pub api_host: String,

    /// Seconds between polling cycles
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value = "60")]
    pub poll_interval_secs: u64,

    /// Per-request timeout for API and chat calls, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Comma-separated sport IDs to poll (defaults to every known sport)
    #[arg(long, env = "SPORT_IDS", value_delimiter = ',')]
    pub sport_ids: Vec<u32>,

    /// Forget matches not seen for this many cycles
    #[arg(long, env = "EVICT_AFTER_CYCLES", default_value = "30")]
    pub evict_after_cycles: u64,

    /// Report degraded health after this many cycles in which every fetch failed
    #[arg(long, env = "DEGRADED_AFTER_CYCLES", default_value = "3")]
    pub degraded_after_cycles: u64,

    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "0.0.0.0:8080")]
    pub dashboard_addr: String,

    /// Telegram bot token (enables chat notifications together with the chat ID)
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_bot_token: Option<String>,

    /// Telegram chat ID that receives notifications
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    /// Telegram Bot API base URL
    #[arg(long, env = "TELEGRAM_API_URL", default_value = "https://api.telegram.org")]
    pub telegram_api_url: String,

    /// Directory for the daily-rotated log file
    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// Log to stdout only
    #[arg(long, env = "NO_LOG_FILE", default_value = "false")]
    pub no_log_file: bool,

    /// Also print notifications to stdout
    #[arg(long, env = "CONSOLE", default_value = "false")]
    pub console: bool,

    /// Run a single polling cycle, print a summary and exit
    #[arg(long)]
    pub once: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.trim().is_empty() {
            anyhow::bail!("SPORTS_API_KEY must not be empty");
        }
        self.api_base_url()?;
        if self.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be positive");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        if self.evict_after_cycles == 0 {
            anyhow::bail!("evict_after_cycles must be positive");
        }
        if self.degraded_after_cycles == 0 {
            anyhow::bail!("degraded_after_cycles must be positive");
        }
        if let Some(unknown) = self.sport_ids.iter().find(|id| sports::lookup(**id).is_none()) {
            anyhow::bail!("unknown sport id {} in SPORT_IDS", unknown);
        }
        if self.telegram_bot_token.is_some() != self.telegram_chat_id.is_some() {
            anyhow::bail!("TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set together");
        }
        Url::parse(&self.telegram_api_url)
            .map_err(|e| anyhow::anyhow!("invalid TELEGRAM_API_URL: {}", e))?;
        Ok(())
    }

    /// Base URL of the odds API; a bare host is assumed to be HTTPS.
    pub fn api_base_url(&self) -> anyhow::Result<Url> {
        let raw = self.api_host.trim();
        let candidate = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("https://{}", raw)
        };
        let url = Url::parse(&candidate)
            .map_err(|e| anyhow::anyhow!("invalid SPORTS_API_HOST '{}': {}", raw, e))?;
        if url.host_str().is_none() {
            anyhow::bail!("SPORTS_API_HOST '{}' has no host", raw);
        }
        Ok(url)
    }

    /// Where the rotating log file goes, unless file logging is off.
    pub fn log_file_dir(&self) -> Option<&Path> {
        if self.no_log_file {
            None
        } else {
            Some(self.log_dir.as_path())
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Sports to poll: the configured list, or every registry entry.
    pub fn sport_ids(&self) -> Vec<u32> {
        if self.sport_ids.is_empty() {
            sports::SPORTS.iter().map(|s| s.id).collect()
        } else {
            let mut ids = Vec::with_capacity(self.sport_ids.len());
            for id in &self.sport_ids {
                if !ids.contains(id) {
                    ids.push(*id);
                }
            }
            ids
        }
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            sport_ids: self.sport_ids(),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            evict_after_cycles: self.evict_after_cycles,
        }
    }
}
