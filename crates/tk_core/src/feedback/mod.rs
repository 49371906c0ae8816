//! # Feedback Module
//!
//! Turns KPI deviations into ranked coaching findings.
//!
//! - `finding` - finding types, prioritization, quick wins
//! - `thresholds` - advisory targets document
//! - `scores` - 0-100 summary scores
//!
//! An undefined KPI never produces a finding, and a KPI without a configured
//! threshold is skipped.

pub mod finding;
pub mod scores;
pub mod thresholds;

pub use finding::{prioritize, quick_wins, Evidence, Finding, QuickWin, Severity};
pub use scores::{compute_scores, Scores};
pub use thresholds::{ThresholdEntry, Thresholds};

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::kpi::{KpiReport, RoundNote};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    pub quick_wins: Vec<QuickWin>,
    pub scores: Scores,
}

/// Feedback document (`feedback.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FeedbackReport {
    pub summary: Summary,
    pub findings: Vec<Finding>,
    pub per_round_notes: Vec<RoundNote>,
}

impl FeedbackReport {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FeedbackReport)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn single(key: &str, value: f64) -> BTreeMap<String, f64> {
    BTreeMap::from([(key.to_string(), value)])
}

/// Defined KPI value paired with its configured threshold, or `None` if either is missing.
fn comparable(name: &str, value: Option<f64>, threshold: Option<f64>) -> Option<(f64, f64)> {
    let value = value.filter(|v| v.is_finite())?;
    match threshold {
        Some(t) => Some((value, t)),
        None => {
            warn!(kpi = name, "no threshold configured, skipping");
            None
        }
    }
}

fn trade_finding(rate: f64, target: f64, notes: &[RoundNote], config: &EngineConfig) -> Finding {
    let rounds: Vec<i64> = notes
        .iter()
        .filter(|n| n.is_untraded_entry())
        .map(|n| n.round)
        .take(config.max_evidence_rounds)
        .collect();

    Finding {
        id: "F_TRADES".to_string(),
        title: "Slow trades after the entry".to_string(),
        severity: if rate < config.trade_high_floor {
            Severity::High
        } else {
            Severity::Medium
        },
        confidence: 0.8,
        impact: 0.8,
        metric_before: single("trade_5s", round2(rate)),
        target: single("trade_5s", target),
        evidence: Evidence::rounds(rounds),
        why_it_matters: "Holding the advantage after the opening duel prevents site collapses."
            .to_string(),
        recommendation: "Assign a trade buddy and avoid isolated peeks without a flash."
            .to_string(),
    }
}

fn flash_finding(effectiveness: f64, target: f64) -> Finding {
    Finding {
        id: "F_FLASH".to_string(),
        title: "Dry peeks: low flash effectiveness".to_string(),
        severity: Severity::Medium,
        confidence: 0.7,
        impact: 0.6,
        metric_before: single("flash_eff", round2(effectiveness)),
        target: single("flash_eff", target),
        evidence: Evidence::default(),
        why_it_matters: "Cheap utility buys advantages.".to_string(),
        recommendation: "Add a pop-flash before the peek and cut-off smokes.".to_string(),
    }
}

fn postplant_finding(early_deaths: f64, max: f64) -> Finding {
    Finding {
        id: "F_PP".to_string(),
        title: "Fragile post-plant (early deaths)".to_string(),
        severity: Severity::Medium,
        confidence: 0.7,
        impact: 0.7,
        metric_before: single("pp_early", round2(early_deaths)),
        target: single("pp_early", max),
        evidence: Evidence::default(),
        why_it_matters: "Keeping numbers after the plant raises the odds of holding the round."
            .to_string(),
        recommendation: "Prioritise crossfires and post-plant roles, avoid isolated peeks."
            .to_string(),
    }
}

/// Evaluate the KPIs against their thresholds. Findings come back unranked.
pub fn evaluate(
    kpis: &KpiReport,
    notes: &[RoundNote],
    thresholds: &Thresholds,
    config: &EngineConfig,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Some((rate, target)) = comparable(
        "trade_rate_5s",
        kpis.trade_rate_5s,
        thresholds.trade_rate_target(),
    ) {
        if rate < target {
            findings.push(trade_finding(rate, target, notes, config));
        }
    }

    if let Some((fe, target)) = comparable(
        "flash_effectiveness",
        kpis.flash_effectiveness,
        thresholds.flash_effectiveness_target(),
    ) {
        if fe < target {
            findings.push(flash_finding(fe, target));
        }
    }

    if let Some((pp, max)) = comparable(
        "postplant_early_deaths",
        kpis.postplant_early_deaths,
        thresholds.postplant_early_deaths_max(),
    ) {
        if pp > max {
            findings.push(postplant_finding(pp, max));
        }
    }

    findings
}

/// Full feedback stage: findings, ranking, quick wins, scores.
pub fn generate(
    kpis: &KpiReport,
    notes: &[RoundNote],
    thresholds: &Thresholds,
    config: &EngineConfig,
) -> FeedbackReport {
    let findings = prioritize(evaluate(kpis, notes, thresholds, config));
    let quick_wins = quick_wins(&findings, config.quick_win_count);
    let scores = compute_scores(kpis, config);

    info!(
        findings = findings.len(),
        quick_wins = quick_wins.len(),
        entry_trades = scores.entry_trades,
        utility = scores.utility,
        postplant = scores.postplant,
        "feedback stage complete"
    );

    FeedbackReport {
        summary: Summary { quick_wins, scores },
        findings,
        per_round_notes: notes.to_vec(),
    }
}
