use async_trait::async_trait;
use thiserror::Error;

use crate::models::Match;

/// Why a single in-play fetch produced no data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("provider reported failure: {0}")]
    Unsuccessful(String),
}

/// Source of in-play events, one sport at a time.
#[async_trait]
pub trait InplayProvider: Send + Sync {
    /// Return every live event currently reported for `sport_id`.
    async fn fetch_inplay(&self, sport_id: u32) -> Result<Vec<Match>, FetchError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
