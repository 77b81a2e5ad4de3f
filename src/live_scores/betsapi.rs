use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::provider::{FetchError, InplayProvider};
use crate::models::{Match, MatchTimer};

/// In-play provider backed by the BetsAPI `v3/events/inplay` endpoint.
pub struct BetsApi {
    http: Client,
    api_key: String,
    /// Scheme + host, overridable in tests
    base_url: String,
}

impl BetsApi {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(BetsApi {
            http,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl InplayProvider for BetsApi {
    fn name(&self) -> &str {
        "BetsAPI"
    }

    async fn fetch_inplay(&self, sport_id: u32) -> Result<Vec<Match>, FetchError> {
        let url = format!("{}/v3/events/inplay", self.base_url);
        debug!("Fetching in-play events for sport {} from {}", sport_id, url);

        let sport = sport_id.to_string();
        let resp = self
            .http
            .get(&url)
            .query(&[("token", self.api_key.as_str()), ("sport_id", sport.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }

        let body = resp.bytes().await?;
        decode_inplay(&body, sport_id)
    }
}

#[derive(Debug, Deserialize)]
struct InplayEnvelope {
    success: Value,
    #[serde(default)]
    results: Option<Vec<Value>>,
    #[serde(default)]
    error: Option<Value>,
}

/// Decode an in-play response body.
///
/// The envelope must carry `success: 1` and a `results` array; anything else is
/// an error. Individual events are decoded leniently with placeholders.
pub fn decode_inplay(body: &[u8], sport_id: u32) -> Result<Vec<Match>, FetchError> {
    let envelope: InplayEnvelope =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if envelope.success.as_i64() != Some(1) {
        let reason = envelope
            .error
            .as_ref()
            .and_then(value_str)
            .unwrap_or_else(|| format!("success = {}", envelope.success));
        return Err(FetchError::Unsuccessful(reason));
    }

    let results = envelope
        .results
        .ok_or_else(|| FetchError::Decode("missing results array".to_string()))?;

    // Events without an id get `sport:league:home:away`, suffixed with the
    // occurrence number when the same key repeats inside one batch.
    let mut synthetic: HashMap<String, usize> = HashMap::new();
    Ok(results
        .iter()
        .map(|ev| {
            let mut m = parse_event(ev, sport_id);
            if m.id.is_empty() {
                let base = format!("{}:{}:{}:{}", sport_id, m.league, m.home, m.away);
                let seen = synthetic.entry(base.clone()).or_insert(0);
                *seen += 1;
                m.id = if *seen == 1 {
                    base
                } else {
                    format!("{}#{}", base, seen)
                };
            }
            m
        })
        .collect())
}

fn parse_event(ev: &Value, sport_id: u32) -> Match {
    let league = name_or(&ev["league"]["name"], "Unknown League");
    let home = name_or(&ev["home"]["name"], "Unknown");
    let away = name_or(&ev["away"]["name"], "Unknown");

    let id = value_str(&ev["id"])
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let timer = &ev["timer"];
    Match {
        id,
        sport_id,
        league,
        home,
        away,
        score: value_str(&ev["ss"]).filter(|s| !s.is_empty()),
        live: value_str(&ev["time_status"]).as_deref() == Some("1"),
        timer: MatchTimer {
            minute: value_str(&timer["tm"]),
            second: value_str(&timer["ts"]),
            ticking: value_str(&timer["tt"]),
            added: value_str(&timer["ta"]),
            quarter: value_str(&timer["q"]),
            period: value_str(&timer["p"]),
            set: value_str(&timer["set"]),
        },
    }
}

fn name_or(v: &Value, default: &str) -> String {
    v.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// String form of a JSON scalar; the feed sends the same field as either.
fn value_str(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
