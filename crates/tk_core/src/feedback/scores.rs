//! 0-100 summary scores.
//!
//! Unlike finding generation, scoring needs a concrete number, so an undefined
//! KPI scores as if it were 0.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::kpi::KpiReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Scores {
    pub entry_trades: u8,
    pub utility: u8,
    pub postplant: u8,
}

/// Round half away from zero and clamp into 0..=100.
pub fn to_score(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

fn or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

pub fn compute_scores(kpis: &KpiReport, config: &EngineConfig) -> Scores {
    let trade = or_zero(kpis.trade_rate_5s);
    let utility = or_zero(kpis.utility_dmg_per_round);
    let postplant = or_zero(kpis.postplant_early_deaths);

    Scores {
        entry_trades: to_score(trade * 100.0),
        utility: to_score((utility / config.utility_damage_reference * 100.0).min(100.0)),
        postplant: to_score((1.0 - postplant.min(1.0)) * 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_from_kpis() {
        let kpis = KpiReport {
            trade_rate_5s: Some(0.624),
            utility_dmg_per_round: Some(13.0),
            postplant_early_deaths: Some(0.25),
            ..KpiReport::default()
        };
        let s = compute_scores(&kpis, &EngineConfig::default());
        assert_eq!(s.entry_trades, 62);
        assert_eq!(s.utility, 65);
        assert_eq!(s.postplant, 75);
    }

    #[test]
    fn test_utility_capped_at_100() {
        let kpis = KpiReport {
            utility_dmg_per_round: Some(55.0),
            ..KpiReport::default()
        };
        assert_eq!(compute_scores(&kpis, &EngineConfig::default()).utility, 100);
    }

    #[test]
    fn test_undefined_kpis_score_as_zero() {
        let s = compute_scores(&KpiReport::default(), &EngineConfig::default());
        assert_eq!(s.entry_trades, 0);
        assert_eq!(s.utility, 0);
        // zero early deaths is a perfect post-plant score
        assert_eq!(s.postplant, 100);
    }

    #[test]
    fn test_to_score_clamps() {
        assert_eq!(to_score(-5.0), 0);
        assert_eq!(to_score(140.0), 100);
        assert_eq!(to_score(49.5), 50);
        assert_eq!(to_score(f64::NAN), 0);
    }
}
