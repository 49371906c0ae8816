//! Post-plant collapse rate.

use tracing::debug;

use crate::models::{Event, RoundRow};

/// Kills in `[plant_ts, plant_ts + window_s]` of the given planted round.
pub fn early_deaths_after_plant(events: &[Event], round: &RoundRow, window_s: f64) -> usize {
    let Some(plant_ts) = round.plant_ts else {
        return 0;
    };
    events
        .iter()
        .filter(|e| e.is_kill() && e.round_key() == round.round_key())
        .filter(|e| e.ts >= plant_ts && e.ts <= plant_ts + window_s)
        .count()
}

/// Share of planted rounds with at least `severe_deaths` early deaths.
///
/// `None` when no round in the table was planted.
pub fn postplant_early_deaths(
    events: &[Event],
    rounds: &[RoundRow],
    window_s: f64,
    severe_deaths: u32,
) -> Option<f64> {
    let planted: Vec<&RoundRow> = rounds.iter().filter(|r| r.plant_ts.is_some()).collect();
    if planted.is_empty() {
        return None;
    }

    let severe = planted
        .iter()
        .filter(|r| early_deaths_after_plant(events, r, window_s) >= severe_deaths as usize)
        .count();

    debug!(planted = planted.len(), severe, window_s, "post-plant early deaths");
    Some(severe as f64 / planted.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn death(round: i64, ts: f64) -> Event {
        Event::kill("m1", round, ts, ("ct1", "B"), ("t1", "A"))
    }

    #[test]
    fn test_two_quick_deaths_is_severe() {
        let events = vec![death(1, 61.0), death(1, 63.0)];
        let rounds = vec![RoundRow::new("m1", 1, Some(60.0))];
        assert_eq!(postplant_early_deaths(&events, &rounds, 5.0, 2), Some(1.0));
    }

    #[test]
    fn test_death_outside_window_not_counted() {
        let events = vec![death(1, 61.0), death(1, 63.0), death(2, 70.0)];
        let rounds = vec![
            RoundRow::new("m1", 1, Some(60.0)),
            RoundRow::new("m1", 2, Some(60.0)),
        ];
        assert_eq!(early_deaths_after_plant(&events, &rounds[1], 5.0), 0);
        assert_eq!(postplant_early_deaths(&events, &rounds, 5.0, 2), Some(0.5));
    }

    #[test]
    fn test_window_is_closed_on_both_ends() {
        let events = vec![death(1, 60.0), death(1, 65.0), death(1, 59.9)];
        let round = RoundRow::new("m1", 1, Some(60.0));
        assert_eq!(early_deaths_after_plant(&events, &round, 5.0), 2);
    }

    #[test]
    fn test_no_planted_rounds_is_undefined() {
        let rounds = vec![RoundRow::new("m1", 1, None)];
        assert_eq!(postplant_early_deaths(&[death(1, 10.0)], &rounds, 5.0, 2), None);
        assert_eq!(postplant_early_deaths(&[], &[], 5.0, 2), None);
    }

    #[test]
    fn test_deaths_from_other_match_ignored() {
        let mut other = death(1, 61.0);
        other.match_id = "m2".to_string();
        let events = vec![death(1, 61.0), other];
        let rounds = vec![RoundRow::new("m1", 1, Some(60.0))];
        assert_eq!(postplant_early_deaths(&events, &rounds, 5.0, 2), Some(0.0));
    }
}
