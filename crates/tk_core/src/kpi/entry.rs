//! Entry duels: the opening kill of each round.

use std::collections::BTreeMap;

use super::kills_by_round;
use crate::models::{Event, Side};

#[derive(Debug, Clone, PartialEq)]
pub struct EntryDuel {
    pub match_id: String,
    pub round: i64,
    pub ts: f64,
    /// Team that took the opening kill
    pub entry_win_team: Option<String>,
    pub side_killer: Option<Side>,
    pub side_victim: Option<Side>,
}

/// First kill by `ts` of every round that has kills, ordered by `(match_id, round)`.
pub fn entry_duels(events: &[Event]) -> Vec<EntryDuel> {
    kills_by_round(events)
        .into_iter()
        .filter_map(|((match_id, round), kills)| {
            let first = kills.first()?;
            Some(EntryDuel {
                match_id: match_id.to_string(),
                round,
                ts: first.ts,
                entry_win_team: first.team_killer.clone(),
                side_killer: first.side_killer,
                side_victim: first.side_victim,
            })
        })
        .collect()
}

/// Opening kills tallied by the killer's side. Entries without a side label are skipped.
pub fn entry_duel_counts_by_side(duels: &[EntryDuel]) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for side in duels.iter().filter_map(|d| d.side_killer) {
        *counts.entry(side.to_string()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_kill_by_ts_is_entry() {
        let events = vec![
            Event::kill("m1", 1, 20.0, ("c", "B"), ("d", "A")).with_sides(Side::CT, Side::T),
            Event::kill("m1", 1, 12.0, ("a", "A"), ("b", "B")).with_sides(Side::T, Side::CT),
            Event::kill("m1", 2, 8.0, ("e", "B"), ("f", "A")).with_sides(Side::CT, Side::T),
        ];
        let duels = entry_duels(&events);
        assert_eq!(duels.len(), 2);
        assert_eq!(duels[0].ts, 12.0);
        assert_eq!(duels[0].entry_win_team.as_deref(), Some("A"));
        assert_eq!(duels[1].round, 2);

        let counts = entry_duel_counts_by_side(&duels);
        assert_eq!(counts.get("T"), Some(&1));
        assert_eq!(counts.get("CT"), Some(&1));
    }

    #[test]
    fn test_rounds_without_kills_have_no_entry() {
        let events = vec![Event::new("m1", 1, 3.0, crate::models::EventKind::Flash)];
        assert!(entry_duels(&events).is_empty());
        assert!(entry_duel_counts_by_side(&[]).is_empty());
    }

    #[test]
    fn test_missing_side_not_tallied() {
        let events = vec![Event::kill("m1", 1, 1.0, ("a", "A"), ("b", "B"))];
        let duels = entry_duels(&events);
        assert_eq!(duels.len(), 1);
        assert!(entry_duel_counts_by_side(&duels).is_empty());
    }
}
