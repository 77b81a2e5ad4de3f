use std::collections::{HashMap, HashSet};

use crate::models::{Match, MatchState, NotificationKind};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    state: MatchState,
    sport_id: u32,
    last_seen_cycle: u64,
}

/// Most recently observed state per match ID.
///
/// Entries that have not been refreshed for `evict_after_cycles` cycles are
/// dropped by [`LastSeenRegistry::evict_stale`].
#[derive(Debug)]
pub struct LastSeenRegistry {
    entries: HashMap<String, Entry>,
    evict_after_cycles: u64,
}

impl LastSeenRegistry {
    pub fn new(evict_after_cycles: u64) -> Self {
        LastSeenRegistry {
            entries: HashMap::new(),
            evict_after_cycles,
        }
    }

    /// Record an observation and report what kind of notification it warrants.
    ///
    /// Always upserts the entry, whether or not a notification is due.
    pub fn observe(&mut self, m: &Match, cycle: u64) -> Option<NotificationKind> {
        let state = m.state();
        match self.entries.get_mut(&m.id) {
            Some(entry) => {
                entry.last_seen_cycle = cycle;
                entry.sport_id = m.sport_id;
                if entry.state == state {
                    None
                } else {
                    entry.state = state;
                    Some(NotificationKind::Update)
                }
            }
            None => {
                self.entries.insert(
                    m.id.clone(),
                    Entry {
                        state,
                        sport_id: m.sport_id,
                        last_seen_cycle: cycle,
                    },
                );
                Some(NotificationKind::New)
            }
        }
    }

    /// Drop entries not seen within the eviction window.
    ///
    /// Entries belonging to `failed_sports` are kept: a failed fetch says
    /// nothing about whether those matches are still live.
    /// Returns the number of evicted entries.
    pub fn evict_stale(&mut self, cycle: u64, failed_sports: &HashSet<u32>) -> usize {
        let before = self.entries.len();
        let window = self.evict_after_cycles;
        self.entries.retain(|_, e| {
            failed_sports.contains(&e.sport_id) || cycle.saturating_sub(e.last_seen_cycle) <= window
        });
        before - self.entries.len()
    }

    #[cfg(test)]
    pub fn get(&self, match_id: &str) -> Option<&MatchState> {
        self.entries.get(match_id).map(|e| &e.state)
    }

    /// Number of matches currently tracked.
    pub fn tracked(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchTimer;

    fn observation(id: &str, sport_id: u32, score: &str, minute: &str) -> Match {
        Match {
            id: id.into(),
            sport_id,
            league: "Premier League".into(),
            home: "Arsenal".into(),
            away: "Chelsea".into(),
            score: Some(score.into()),
            live: true,
            timer: MatchTimer {
                minute: Some(minute.into()),
                ..MatchTimer::default()
            },
        }
    }

    #[test]
    fn test_new_update_then_silence() {
        let mut reg = LastSeenRegistry::new(30);

        let first = observation("12345", 1, "0-0", "1");
        assert_eq!(reg.observe(&first, 1), Some(NotificationKind::New));
        assert_eq!(reg.tracked(), 1);

        let second = observation("12345", 1, "1-0", "23");
        assert_eq!(reg.observe(&second, 2), Some(NotificationKind::Update));
        assert_eq!(
            reg.get("12345"),
            Some(&MatchState {
                score: "1-0".into(),
                time: "23".into()
            })
        );

        assert_eq!(reg.observe(&second, 3), None);
        assert_eq!(reg.tracked(), 1);
    }

    #[test]
    fn test_identical_state_never_renotifies() {
        let mut reg = LastSeenRegistry::new(30);
        let m = observation("7", 18, "50-48", "8");
        assert_eq!(reg.observe(&m, 1), Some(NotificationKind::New));
        for cycle in 2..10 {
            assert_eq!(reg.observe(&m, cycle), None);
        }
    }

    #[test]
    fn test_time_change_alone_is_an_update() {
        let mut reg = LastSeenRegistry::new(30);
        reg.observe(&observation("9", 1, "0-0", "10"), 1);
        assert_eq!(
            reg.observe(&observation("9", 1, "0-0", "11"), 2),
            Some(NotificationKind::Update)
        );
    }

    #[test]
    fn test_evicts_only_stale_entries() {
        let mut reg = LastSeenRegistry::new(2);
        reg.observe(&observation("old", 1, "0-0", "1"), 1);
        reg.observe(&observation("fresh", 1, "0-0", "1"), 3);

        assert_eq!(reg.evict_stale(3, &HashSet::new()), 0);
        assert_eq!(reg.evict_stale(4, &HashSet::new()), 1);
        assert!(reg.get("old").is_none());
        assert!(reg.get("fresh").is_some());
    }

    #[test]
    fn test_failed_sport_entries_survive_eviction() {
        let mut reg = LastSeenRegistry::new(1);
        reg.observe(&observation("soccer", 1, "0-0", "1"), 1);
        reg.observe(&observation("hoops", 18, "0-0", "1"), 1);

        let failed: HashSet<u32> = [1].into_iter().collect();
        assert_eq!(reg.evict_stale(5, &failed), 1);
        assert!(reg.get("soccer").is_some());
        assert!(reg.get("hoops").is_none());
    }

    #[test]
    fn test_evicted_match_is_new_again() {
        let mut reg = LastSeenRegistry::new(1);
        let m = observation("42", 1, "0-0", "1");
        reg.observe(&m, 1);
        reg.evict_stale(10, &HashSet::new());
        assert_eq!(reg.tracked(), 0);
        assert_eq!(reg.observe(&m, 10), Some(NotificationKind::New));
    }
}
