//! # Engine Configuration
//!
//! Tuning constants for the KPI and feedback stages, passed explicitly into
//! each stage as an immutable value.
//!
//! ## Usage
//! ```rust
//! use tk_core::config::{EngineConfig, NoteTradeRule};
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.trade_window_s, 5.0);
//!
//! let strict = EngineConfig::strict_notes();
//! assert_eq!(strict.note_trade_rule, NoteTradeRule::SameTeam);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};

/// What counts as "traded" when deciding whether to emit an untraded-entry note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NoteTradeRule {
    /// Any kill of the entry killer inside the window, regardless of team
    #[default]
    AnyAvenger,
    /// The avenging kill must also come from the entry victim's team
    SameTeam,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Trade window in seconds, `(ts, ts + window]`
    pub trade_window_s: f64,
    /// Post-plant window in seconds, `[plant_ts, plant_ts + window]`
    pub postplant_window_s: f64,
    /// Early deaths needed for a planted round to count as a collapse
    pub severe_postplant_deaths: u32,
    pub note_trade_rule: NoteTradeRule,
    /// Trade rate under this escalates the trade finding to high severity
    pub trade_high_floor: f64,
    pub max_evidence_rounds: usize,
    pub quick_win_count: usize,
    /// Utility damage per round that maps to a utility score of 100
    pub utility_damage_reference: f64,
    /// Radius for labelling unmapped entry positions with the nearest zone
    /// centroid in the same layer. `None` keeps the "unmapped area" label.
    pub nearest_zone_fallback: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trade_window_s: 5.0,
            postplant_window_s: 5.0,
            severe_postplant_deaths: 2,
            note_trade_rule: NoteTradeRule::AnyAvenger,
            trade_high_floor: 0.55,
            max_evidence_rounds: 5,
            quick_win_count: 3,
            utility_damage_reference: 20.0,
            nearest_zone_fallback: None,
        }
    }
}

impl EngineConfig {
    /// Default constants with the team-checked note trade rule.
    pub fn strict_notes() -> Self {
        Self {
            note_trade_rule: NoteTradeRule::SameTeam,
            ..Self::default()
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: EngineConfig = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| AnalyticsError::io(path, e))?;
        Self::from_yaml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        let windows = [
            ("trade_window_s", self.trade_window_s),
            ("postplant_window_s", self.postplant_window_s),
            ("utility_damage_reference", self.utility_damage_reference),
        ];
        for (name, value) in windows {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalyticsError::InvalidConfig(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if let Some(radius) = self.nearest_zone_fallback {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(AnalyticsError::InvalidConfig(format!(
                    "nearest_zone_fallback must be a positive number, got {}",
                    radius
                )));
            }
        }
        Ok(())
    }
}
