use serde::{Deserialize, Serialize};

use super::Event;

/// One row of the rounds table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRow {
    pub match_id: String,
    pub round: i64,
    /// Absent when the bomb was never planted
    pub plant_ts: Option<f64>,
}

impl RoundRow {
    pub fn new(match_id: impl Into<String>, round: i64, plant_ts: Option<f64>) -> Self {
        Self {
            match_id: match_id.into(),
            round,
            plant_ts,
        }
    }

    pub fn round_key(&self) -> (&str, i64) {
        (self.match_id.as_str(), self.round)
    }
}

/// Both input tables of one run, validated and owned.
#[derive(Debug, Clone, Default)]
pub struct MatchData {
    pub events: Vec<Event>,
    pub rounds: Vec<RoundRow>,
}

impl MatchData {
    pub fn new(events: Vec<Event>, rounds: Vec<RoundRow>) -> Self {
        Self { events, rounds }
    }
}
