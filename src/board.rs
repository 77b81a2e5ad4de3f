use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::live_scores::CycleReport;
use crate::models::Match;

/// Latest cycle output plus health counters, shared with the HTTP surface.
#[derive(Clone)]
pub struct LiveBoard {
    inner: Arc<RwLock<BoardInner>>,
    degraded_after_cycles: u64,
}

#[derive(Debug, Default)]
struct BoardInner {
    matches: BTreeMap<u32, Vec<Match>>,
    last_update: Option<DateTime<Utc>>,
    cycles: u64,
    consecutive_failed_cycles: u64,
    /// sport id -> consecutive failed fetches
    failing_sports: BTreeMap<u32, u64>,
    tracked_matches: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub cycles: u64,
    pub consecutive_failed_cycles: u64,
    pub failing_sports: BTreeMap<u32, u64>,
    pub tracked_matches: usize,
    pub last_update: Option<DateTime<Utc>>,
}

impl LiveBoard {
    pub fn new(degraded_after_cycles: u64) -> Self {
        LiveBoard {
            inner: Arc::new(RwLock::new(BoardInner::default())),
            degraded_after_cycles,
        }
    }

    /// Replace the visible match set with a finished cycle's output.
    pub async fn publish(&self, report: &CycleReport) {
        let mut inner = self.inner.write().await;
        inner.matches = report
            .matches_by_sport
            .iter()
            .filter(|(_, matches)| !matches.is_empty())
            .map(|(sport, matches)| (*sport, matches.clone()))
            .collect();
        inner.last_update = Some(report.finished_at);
        inner.cycles += 1;
        inner.tracked_matches = report.tracked_matches;

        if report.all_failed() {
            inner.consecutive_failed_cycles += 1;
        } else {
            inner.consecutive_failed_cycles = 0;
        }

        for sport in report.matches_by_sport.keys() {
            inner.failing_sports.remove(sport);
        }
        for sport in &report.failed_sports {
            *inner.failing_sports.entry(*sport).or_default() += 1;
        }
    }

    pub async fn matches(&self) -> (BTreeMap<u32, Vec<Match>>, Option<DateTime<Utc>>) {
        let inner = self.inner.read().await;
        (inner.matches.clone(), inner.last_update)
    }

    pub async fn matches_for(&self, sport_id: u32) -> (Vec<Match>, Option<DateTime<Utc>>) {
        let inner = self.inner.read().await;
        (
            inner.matches.get(&sport_id).cloned().unwrap_or_default(),
            inner.last_update,
        )
    }

    pub async fn health(&self) -> HealthSnapshot {
        let inner = self.inner.read().await;
        let status = if inner.consecutive_failed_cycles >= self.degraded_after_cycles {
            HealthStatus::Degraded
        } else {
            HealthStatus::Ok
        };
        HealthSnapshot {
            status,
            cycles: inner.cycles,
            consecutive_failed_cycles: inner.consecutive_failed_cycles,
            failing_sports: inner.failing_sports.clone(),
            tracked_matches: inner.tracked_matches,
            last_update: inner.last_update,
        }
    }
}
