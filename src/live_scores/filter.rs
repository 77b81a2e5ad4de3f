/// League-name fragments that mark simulated / virtual competitions.
///
/// "e-" also matches real leagues with that substring; that false positive is
/// accepted.
pub const ESPORT_KEYWORDS: &[&str] = &[
    "esoccer",
    "esports",
    "e-",
    "cyber",
    "ebasketball",
    "etennis",
    "evolleyball",
    "ehockey",
];

/// True when the league name looks like an e-sport league.
pub fn is_esport(league: &str) -> bool {
    let league = league.to_lowercase();
    ESPORT_KEYWORDS.iter().any(|kw| league.contains(kw))
}
