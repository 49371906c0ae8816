//! Utility usage: flash conversion and grenade damage.

use std::collections::BTreeSet;

use tracing::debug;

use crate::models::{Event, RoundRow};

/// Flash-assisted kills per effective flash; `None` when no flash was thrown.
///
/// The denominator is floored at 1, so flashes that blinded nobody still
/// produce a number instead of a division by zero.
pub fn flash_effectiveness(events: &[Event]) -> Option<f64> {
    let flashes: Vec<&Event> = events.iter().filter(|e| e.is_flash()).collect();
    if flashes.is_empty() {
        return None;
    }

    let effective = flashes.iter().filter(|e| e.flashed_enemies > 0).count();
    let assists = events
        .iter()
        .filter(|e| e.is_kill() && e.is_flash_assist)
        .count();

    debug!(flashes = flashes.len(), effective, assists, "flash effectiveness");
    Some(assists as f64 / effective.max(1) as f64)
}

/// Total grenade damage over the number of distinct rounds in the rounds table (floored at 1).
pub fn utility_damage_per_round(events: &[Event], rounds: &[RoundRow]) -> f64 {
    let damage: f64 = events.iter().map(|e| e.nade_damage).sum();
    let distinct: BTreeSet<(&str, i64)> = rounds.iter().map(RoundRow::round_key).collect();
    damage / distinct.len().max(1) as f64
}
