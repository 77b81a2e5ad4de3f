pub mod betsapi;
pub mod filter;
pub mod provider;
pub mod registry;
pub mod sports;

pub use betsapi::BetsApi;
pub use provider::InplayProvider;
pub use registry::LastSeenRegistry;

use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::board::LiveBoard;
use crate::models::Match;
use crate::notify::{build_notification, Notifier};

/// Everything the poller needs to know; built by `main` from the CLI config.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Sports to poll, in processing order
    pub sport_ids: Vec<u32>,
    /// Delay between the start of two polling cycles
    pub poll_interval: Duration,
    /// Registry entries unseen for longer than this many cycles are dropped
    pub evict_after_cycles: u64,
}

/// Outcome of one polling cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle: u64,
    /// Filtered matches for every sport whose fetch succeeded
    pub matches_by_sport: BTreeMap<u32, Vec<Match>>,
    pub failed_sports: Vec<u32>,
    pub notifications: usize,
    pub sink_failures: usize,
    pub evicted: usize,
    pub tracked_matches: usize,
    pub finished_at: DateTime<Utc>,
}

impl CycleReport {
    /// True when at least one sport was polled and none succeeded.
    pub fn all_failed(&self) -> bool {
        !self.failed_sports.is_empty() && self.matches_by_sport.is_empty()
    }

    pub fn total_matches(&self) -> usize {
        self.matches_by_sport.values().map(Vec::len).sum()
    }
}

/// Fetches in-play events, diffs them against the last-seen registry and
/// notifies on new or changed matches.
pub struct Poller {
    config: PollerConfig,
    provider: Arc<dyn InplayProvider>,
    notifier: Notifier,
    board: LiveBoard,
    registry: LastSeenRegistry,
    cycle: u64,
}

impl Poller {
    pub fn new(
        config: PollerConfig,
        provider: Arc<dyn InplayProvider>,
        notifier: Notifier,
        board: LiveBoard,
    ) -> Self {
        let registry = LastSeenRegistry::new(config.evict_after_cycles);
        Poller {
            config,
            provider,
            notifier,
            board,
            registry,
            cycle: 0,
        }
    }

    /// Run one full cycle: fetch every sport concurrently, then diff and
    /// notify sequentially so per-match ordering is preserved.
    pub async fn poll_cycle(&mut self) -> CycleReport {
        self.cycle += 1;
        let cycle = self.cycle;

        let fetches = self.config.sport_ids.iter().map(|&sport_id| {
            let provider = Arc::clone(&self.provider);
            async move { (sport_id, provider.fetch_inplay(sport_id).await) }
        });
        let results = futures_util::future::join_all(fetches).await;

        let mut matches_by_sport = BTreeMap::new();
        let mut failed_sports = Vec::new();
        let mut notifications = 0;
        let mut sink_failures = 0;
        let mut seen_ids: HashSet<String> = HashSet::new();

        for (sport_id, result) in results {
            let fetched = match result {
                Ok(matches) => matches,
                Err(e) => {
                    warn!(
                        "{} fetch for {} (sport {}) failed: {}",
                        self.provider.name(),
                        sports::name_for(sport_id),
                        sport_id,
                        e
                    );
                    failed_sports.push(sport_id);
                    continue;
                }
            };

            let total = fetched.len();
            let mut duplicates = 0;
            let mut live: Vec<Match> = Vec::with_capacity(total);
            for m in fetched {
                if filter::is_esport(&m.league) {
                    continue;
                }
                // One observation per match per cycle; the first occurrence wins.
                if !seen_ids.insert(m.id.clone()) {
                    duplicates += 1;
                    continue;
                }
                live.push(m);
            }
            live.sort_by_key(|m| Reverse(elapsed_minutes(m)));
            if duplicates > 0 {
                warn!(
                    "Sport {}: skipped {} events with a repeated match id",
                    sport_id, duplicates
                );
            }
            debug!(
                "Sport {}: {} events, {} after e-sport filter",
                sport_id,
                total,
                live.len()
            );
            if !live.is_empty() {
                info!(
                    "{} Live {} matches ({} total)",
                    sports::emoji_for(sport_id),
                    sports::name_for(sport_id),
                    live.len()
                );
            }

            for m in &live {
                if let Some(kind) = self.registry.observe(m, cycle) {
                    let notification = build_notification(kind, m);
                    sink_failures += self.notifier.dispatch(&notification).await;
                    notifications += 1;
                }
            }
            matches_by_sport.insert(sport_id, live);
        }

        let failed: HashSet<u32> = failed_sports.iter().copied().collect();
        let evicted = self.registry.evict_stale(cycle, &failed);
        if evicted > 0 {
            debug!("Evicted {} stale matches from registry", evicted);
        }

        let report = CycleReport {
            cycle,
            matches_by_sport,
            failed_sports,
            notifications,
            sink_failures,
            evicted,
            tracked_matches: self.registry.tracked(),
            finished_at: Utc::now(),
        };
        self.board.publish(&report).await;
        report
    }

    /// Poll on a fixed interval until `cancel` fires.
    ///
    /// A cycle already in progress runs to completion before the loop exits.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            "Live poller started (provider={}, sports={:?}, interval={:?}, sinks={:?})",
            self.provider.name(),
            self.config.sport_ids,
            self.config.poll_interval,
            self.notifier.sink_names()
        );

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let report = self.poll_cycle().await;
                    info!(
                        "Cycle {} done: {} matches, {} notifications ({} sink failures), \
                         {} failed sports, {} tracked, {} evicted",
                        report.cycle,
                        report.total_matches(),
                        report.notifications,
                        report.sink_failures,
                        report.failed_sports.len(),
                        report.tracked_matches,
                        report.evicted
                    );
                }
            }
        }

        info!("Live poller stopped after {} cycles", self.cycle);
    }

    /// Spawn [`Poller::run`] on the runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}

fn elapsed_minutes(m: &Match) -> i64 {
    m.elapsed().trim().parse().unwrap_or(0)
}
