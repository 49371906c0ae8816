//! # KPI Module
//!
//! Windowed, event-correlated team statistics over one completed match set.
//!
//! - `entry` - opening duels per round
//! - `trade` - trade rate inside the trade window
//! - `utility` - flash effectiveness and grenade damage per round
//! - `postplant` - early-death collapse rate after the plant
//! - `notes` - per-round tactical notes
//!
//! Metrics whose denominator is empty are `None` ("undefined") and stay that
//! way through serialization (`null`).

pub mod entry;
pub mod notes;
pub mod postplant;
pub mod trade;
pub mod utility;

pub use entry::{entry_duel_counts_by_side, entry_duels, EntryDuel};
pub use notes::{per_round_notes, RoundNote, UNMAPPED_ZONE, UNTRADED_MARKER};
pub use postplant::postplant_early_deaths;
pub use trade::trade_rate;
pub use utility::{flash_effectiveness, utility_damage_per_round};

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EngineConfig;
use crate::models::{Event, MatchData};
use crate::zone::ZoneIndex;

/// Kill events grouped by `(match_id, round)`, each group stably sorted by `ts`.
pub(crate) fn kills_by_round(events: &[Event]) -> BTreeMap<(&str, i64), Vec<&Event>> {
    let mut groups: BTreeMap<(&str, i64), Vec<&Event>> = BTreeMap::new();
    for ev in events.iter().filter(|e| e.is_kill()) {
        groups.entry(ev.round_key()).or_default().push(ev);
    }
    for kills in groups.values_mut() {
        kills.sort_by(|a, b| a.ts.total_cmp(&b.ts));
    }
    groups
}

/// NaN never leaves the engine as a number.
fn defined(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Team KPI document (`kpis_team.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KpiReport {
    #[serde(default)]
    pub trade_rate_5s: Option<f64>,
    #[serde(default)]
    pub flash_effectiveness: Option<f64>,
    #[serde(default)]
    pub utility_dmg_per_round: Option<f64>,
    #[serde(default)]
    pub postplant_early_deaths: Option<f64>,
    #[serde(default)]
    pub entry_duel_counts_by_side: BTreeMap<String, u32>,
}

impl KpiReport {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(KpiReport)
    }
}

/// Everything the KPI stage produces for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiOutput {
    pub kpis: KpiReport,
    pub notes: Vec<RoundNote>,
    pub entries: Vec<EntryDuel>,
}

/// KPI stage bound to one map and one configuration.
pub struct KpiEngine<'a> {
    zones: &'a ZoneIndex,
    config: EngineConfig,
}

impl<'a> KpiEngine<'a> {
    pub fn new(zones: &'a ZoneIndex, config: EngineConfig) -> Self {
        Self { zones, config }
    }

    pub fn run(&self, data: &MatchData) -> KpiOutput {
        let cfg = &self.config;
        let entries = entry_duels(&data.events);

        let kpis = KpiReport {
            trade_rate_5s: defined(trade_rate(&data.events, cfg.trade_window_s)),
            flash_effectiveness: defined(flash_effectiveness(&data.events)),
            utility_dmg_per_round: defined(Some(utility_damage_per_round(
                &data.events,
                &data.rounds,
            ))),
            postplant_early_deaths: defined(postplant_early_deaths(
                &data.events,
                &data.rounds,
                cfg.postplant_window_s,
                cfg.severe_postplant_deaths,
            )),
            entry_duel_counts_by_side: entry_duel_counts_by_side(&entries),
        };

        let notes = per_round_notes(&data.events, self.zones, cfg);

        info!(
            events = data.events.len(),
            rounds = data.rounds.len(),
            entries = entries.len(),
            notes = notes.len(),
            "KPI stage complete"
        );

        KpiOutput {
            kpis,
            notes,
            entries,
        }
    }
}
