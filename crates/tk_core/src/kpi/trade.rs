//! Trade rate: share of kills avenged inside the trade window.

use tracing::debug;

use super::kills_by_round;
use crate::models::Event;

/// Whether `later` avenges `earlier` on a team basis.
///
/// The avenging kill must come from `earlier`'s victim team and take out the
/// original killer. Rows naming `earlier`'s victim as the killer also match,
/// which is how adapters that attribute trades to the fallen player encode them.
pub fn avenges(earlier: &Event, later: &Event) -> bool {
    let same_team = matches!(
        (&later.team_killer, &earlier.team_victim),
        (Some(a), Some(b)) if a == b
    );
    if !same_team {
        return false;
    }

    let punishes_killer = matches!(
        (&later.victim, &earlier.killer),
        (Some(a), Some(b)) if a == b
    );
    let credited_to_victim = matches!(
        (&later.killer, &earlier.victim),
        (Some(a), Some(b)) if a == b
    );
    punishes_killer || credited_to_victim
}

/// `later` falls inside `(earlier.ts, earlier.ts + window_s]`.
pub fn in_trade_window(earlier: &Event, later: &Event, window_s: f64) -> bool {
    later.ts > earlier.ts && later.ts <= earlier.ts + window_s
}

/// Traded kills over all kills; `None` when there are no kills.
///
/// A kill is traded at most once, however many follow-up kills qualify.
pub fn trade_rate(events: &[Event], window_s: f64) -> Option<f64> {
    let mut total = 0usize;
    let mut traded = 0usize;

    for (_, kills) in kills_by_round(events) {
        total += kills.len();
        traded += kills
            .iter()
            .filter(|k1| {
                kills
                    .iter()
                    .any(|k2| in_trade_window(k1, k2, window_s) && avenges(k1, k2))
            })
            .count();
    }

    debug!(total, traded, window_s, "trade rate");

    if total == 0 {
        return None;
    }
    Some(traded as f64 / total as f64)
}
