//! Per-round tactical notes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::kills_by_round;
use super::trade::in_trade_window;
use crate::config::{EngineConfig, NoteTradeRule};
use crate::models::Event;
use crate::zone::ZoneIndex;

/// Substring every untraded-entry note carries; the feedback stage keys evidence off it.
pub const UNTRADED_MARKER: &str = "untraded";

/// Zone label used when the entry position is not inside any mapped zone.
pub const UNMAPPED_ZONE: &str = "unmapped area";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RoundNote {
    pub match_id: String,
    pub round: i64,
    pub note: String,
}

impl RoundNote {
    pub fn is_untraded_entry(&self) -> bool {
        self.note.contains(UNTRADED_MARKER)
    }
}

pub fn untraded_entry_note(zone: &str, window_s: f64) -> String {
    format!(
        "Opponent entry in {} {} within ≤{}s",
        zone, UNTRADED_MARKER, window_s
    )
}

fn entry_was_traded(entry: &Event, kills: &[&Event], config: &EngineConfig) -> bool {
    kills.iter().any(|k| {
        let kills_entry_killer = matches!(
            (&k.victim, &entry.killer),
            (Some(a), Some(b)) if a == b
        );
        let team_ok = match config.note_trade_rule {
            NoteTradeRule::AnyAvenger => true,
            NoteTradeRule::SameTeam => matches!(
                (&k.team_killer, &entry.team_victim),
                (Some(a), Some(b)) if a == b
            ),
        };
        in_trade_window(entry, k, config.trade_window_s) && kills_entry_killer && team_ok
    })
}

/// One note per round whose cross-team entry kill went untraded, ordered by `(match_id, round)`.
pub fn per_round_notes(events: &[Event], zones: &ZoneIndex, config: &EngineConfig) -> Vec<RoundNote> {
    let mut notes = Vec::new();
    for ((match_id, round), kills) in kills_by_round(events) {
        let Some(entry) = kills.first() else {
            continue;
        };
        if !entry.is_cross_team() || entry_was_traded(entry, &kills, config) {
            continue;
        }
        let zone = zones
            .zone_of(entry.x, entry.y, entry.z)
            .or_else(|| {
                config
                    .nearest_zone_fallback
                    .and_then(|radius| zones.nearest_zone(entry.x, entry.y, entry.z, radius))
            })
            .unwrap_or(UNMAPPED_ZONE);
        notes.push(RoundNote {
            match_id: match_id.to_string(),
            round,
            note: untraded_entry_note(zone, config.trade_window_s),
        });
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::ZoneConfig;

    fn index() -> ZoneIndex {
        let cfg = ZoneConfig::from_yaml_str(
            "z_layers: [{name: g, z_min: 0, z_max: 100}]\nzones: [{id: mid, layer: g, polygon: [[0, 0], [100, 0], [100, 100], [0, 100]]}]\n",
        )
        .unwrap();
        ZoneIndex::new(cfg).unwrap()
    }

    fn entry(ts: f64) -> Event {
        Event::kill("m1", 3, ts, ("a", "A"), ("b", "B")).with_position(50.0, 50.0, 10.0)
    }

    #[test]
    fn test_untraded_entry_emits_note_with_zone() {
        let notes = per_round_notes(&[entry(10.0)], &index(), &EngineConfig::default());
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].round, 3);
        assert_eq!(notes[0].note, "Opponent entry in mid untraded within ≤5s");
        assert!(notes[0].is_untraded_entry());
    }

    #[test]
    fn test_traded_entry_emits_nothing() {
        let trade = Event::kill("m1", 3, 13.0, ("c", "B"), ("a", "A"));
        let notes = per_round_notes(&[entry(10.0), trade], &index(), &EngineConfig::default());
        assert!(notes.is_empty());
    }

    #[test]
    fn test_late_trade_still_noted() {
        let trade = Event::kill("m1", 3, 15.5, ("c", "B"), ("a", "A"));
        let notes = per_round_notes(&[entry(10.0), trade], &index(), &EngineConfig::default());
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_teamkill_entry_emits_nothing() {
        let tk = Event::kill("m1", 3, 10.0, ("a", "A"), ("a2", "A"));
        assert!(per_round_notes(&[tk], &index(), &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_unmapped_position_uses_placeholder() {
        let far = entry(10.0).with_position(500.0, 500.0, 10.0);
        let notes = per_round_notes(&[far], &index(), &EngineConfig::default());
        assert_eq!(notes[0].note, "Opponent entry in unmapped area untraded within ≤5s");
    }

    #[test]
    fn test_nearest_zone_fallback_labels_near_misses() {
        // centroid of mid is (50, 50); (120, 50) is 70 units away
        let near = entry(10.0).with_position(120.0, 50.0, 10.0);
        let config = EngineConfig {
            nearest_zone_fallback: Some(200.0),
            ..EngineConfig::default()
        };
        let notes = per_round_notes(&[near.clone()], &index(), &config);
        assert_eq!(notes[0].note, "Opponent entry in mid untraded within ≤5s");

        let tight = EngineConfig {
            nearest_zone_fallback: Some(50.0),
            ..EngineConfig::default()
        };
        let notes = per_round_notes(&[near], &index(), &tight);
        assert_eq!(notes[0].note, "Opponent entry in unmapped area untraded within ≤5s");
    }

    #[test]
    fn test_friendly_avenger_respects_note_rule() {
        // the entry killer is then killed by their own teammate
        let friendly = Event::kill("m1", 3, 12.0, ("z", "A"), ("a", "A"));
        let events = vec![entry(10.0), friendly];

        let loose = per_round_notes(&events, &index(), &EngineConfig::default());
        assert!(loose.is_empty());

        let strict = per_round_notes(&events, &index(), &EngineConfig::strict_notes());
        assert_eq!(strict.len(), 1);
    }

    #[test]
    fn test_no_kills_no_notes() {
        assert!(per_round_notes(&[], &index(), &EngineConfig::default()).is_empty());
    }
}
