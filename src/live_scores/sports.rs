use crate::models::Match;

/// How a sport's progress is labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodRule {
    /// Soccer: "1H" up to minute 45, "2H" after. No extra time.
    Halves,
    /// Basketball: "Q{n}" from the timer's quarter counter.
    Quarters,
    /// Tennis: current set inferred from the score's completed sets.
    TennisSets,
    /// Volleyball: "Set {n}" from the timer's set counter.
    Sets,
    /// Ice hockey: "P{n}" from the timer's period counter.
    Periods,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sport {
    pub id: u32,
    pub name: &'static str,
    pub emoji: &'static str,
    pub period_rule: PeriodRule,
}

const fn sport(id: u32, name: &'static str, emoji: &'static str, period_rule: PeriodRule) -> Sport {
    Sport {
        id,
        name,
        emoji,
        period_rule,
    }
}

/// Sports polled by default, in polling order.
pub const SPORTS: &[Sport] = &[
    sport(1, "Soccer", "⚽", PeriodRule::Halves),
    sport(18, "Basketball", "🏀", PeriodRule::Quarters),
    sport(13, "Tennis", "🎾", PeriodRule::TennisSets),
    sport(91, "Volleyball", "🏐", PeriodRule::Sets),
    sport(17, "Ice Hockey", "🏒", PeriodRule::Periods),
    sport(78, "Handball", "🤾", PeriodRule::None),
    sport(16, "Baseball", "⚾", PeriodRule::None),
    sport(12, "American Football", "🏈", PeriodRule::None),
    sport(14, "Snooker", "🎱", PeriodRule::None),
    sport(15, "Darts", "🎯", PeriodRule::None),
    sport(92, "Table Tennis", "🏓", PeriodRule::None),
    sport(94, "Badminton", "🏸", PeriodRule::None),
    sport(19, "Rugby League", "🏉", PeriodRule::None),
    sport(36, "Australian Rules", "🏉", PeriodRule::None),
    sport(95, "Beach Volleyball", "🏐", PeriodRule::None),
];

const UNKNOWN_SPORT_EMOJI: &str = "🎮";
const NO_PERIOD: &str = "-";

pub fn lookup(id: u32) -> Option<&'static Sport> {
    SPORTS.iter().find(|s| s.id == id)
}

pub fn emoji_for(id: u32) -> &'static str {
    lookup(id).map(|s| s.emoji).unwrap_or(UNKNOWN_SPORT_EMOJI)
}

pub fn name_for(id: u32) -> &'static str {
    lookup(id).map(|s| s.name).unwrap_or("Unknown sport")
}

/// Derive a human-readable period label for a match.
///
/// Returns "-" for matches that are not live, sports without a rule, and
/// clocks that cannot be read.
pub fn derive_period(m: &Match, sport_id: u32) -> String {
    if !m.live {
        return NO_PERIOD.to_string();
    }
    let rule = lookup(sport_id)
        .map(|s| s.period_rule)
        .unwrap_or(PeriodRule::None);

    match rule {
        PeriodRule::Halves => match m.elapsed().trim().parse::<i64>() {
            Ok(minute) if minute <= 45 => "1H".to_string(),
            Ok(_) => "2H".to_string(),
            Err(_) => NO_PERIOD.to_string(),
        },
        PeriodRule::Quarters => format!("Q{}", counter(m.timer.quarter.as_deref())),
        PeriodRule::TennisSets => match m.score.as_deref() {
            Some(score) if !score.is_empty() => {
                let completed = score.matches(',').count();
                format!("Set {}", completed + 1)
            }
            _ => NO_PERIOD.to_string(),
        },
        PeriodRule::Sets => format!("Set {}", counter(m.timer.set.as_deref())),
        PeriodRule::Periods => format!("P{}", counter(m.timer.period.as_deref())),
        PeriodRule::None => NO_PERIOD.to_string(),
    }
}

fn counter(raw: Option<&str>) -> &str {
    raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchTimer;

    fn live_match(sport_id: u32) -> Match {
        Match {
            id: "1".into(),
            sport_id,
            league: "League".into(),
            home: "Home".into(),
            away: "Away".into(),
            score: None,
            live: true,
            timer: MatchTimer::default(),
        }
    }

    fn soccer_at(minute: &str, live: bool) -> Match {
        let mut m = live_match(1);
        m.live = live;
        m.timer.minute = Some(minute.into());
        m
    }

    #[test]
    fn test_registry_has_fifteen_unique_sports() {
        assert_eq!(SPORTS.len(), 15);
        let mut ids: Vec<u32> = SPORTS.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 15);
    }

    #[test]
    fn test_lookup_and_unknown_emoji() {
        assert_eq!(lookup(18).map(|s| s.name), Some("Basketball"));
        assert_eq!(emoji_for(1), "⚽");
        assert_eq!(emoji_for(999), "🎮");
    }

    #[test]
    fn test_soccer_halves() {
        assert_eq!(derive_period(&soccer_at("45", true), 1), "1H");
        assert_eq!(derive_period(&soccer_at("46", true), 1), "2H");
        assert_eq!(derive_period(&soccer_at("90", false), 1), "-");
    }

    #[test]
    fn test_soccer_missing_minute_is_first_half() {
        assert_eq!(derive_period(&live_match(1), 1), "1H");
        assert_eq!(derive_period(&soccer_at("HT", true), 1), "-");
    }

    #[test]
    fn test_tennis_sets_from_score() {
        let mut m = live_match(13);
        m.score = Some("6-4,3-6,2-1".into());
        assert_eq!(derive_period(&m, 13), "Set 3");
        m.score = Some("2-1".into());
        assert_eq!(derive_period(&m, 13), "Set 1");
        m.score = None;
        assert_eq!(derive_period(&m, 13), "-");
    }

    #[test]
    fn test_counter_based_rules() {
        let mut bb = live_match(18);
        bb.timer.quarter = Some("3".into());
        assert_eq!(derive_period(&bb, 18), "Q3");
        assert_eq!(derive_period(&live_match(18), 18), "Q1");

        let mut vb = live_match(91);
        vb.timer.set = Some("4".into());
        assert_eq!(derive_period(&vb, 91), "Set 4");

        let mut hockey = live_match(17);
        hockey.timer.period = Some("2".into());
        assert_eq!(derive_period(&hockey, 17), "P2");
    }

    #[test]
    fn test_sports_without_rule() {
        assert_eq!(derive_period(&live_match(78), 78), "-");
        assert_eq!(derive_period(&live_match(4242), 4242), "-");
    }
}
