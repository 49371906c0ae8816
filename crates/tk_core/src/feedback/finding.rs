//! Coaching findings and their ranking.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// low/medium/high → 1/2/3
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Evidence {
    /// Round numbers backing the finding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds: Option<Vec<i64>>,
}

impl Evidence {
    pub fn rounds(rounds: Vec<i64>) -> Self {
        Self {
            rounds: Some(rounds),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    pub id: String,
    pub title: String,
    pub severity: Severity,
    /// 0.0 - 1.0
    pub confidence: f64,
    /// 0.0 - 1.0
    pub impact: f64,
    pub metric_before: BTreeMap<String, f64>,
    pub target: BTreeMap<String, f64>,
    pub evidence: Evidence,
    pub why_it_matters: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuickWin {
    pub title: String,
    pub impact: f64,
    pub effort: String,
}

impl From<&Finding> for QuickWin {
    fn from(f: &Finding) -> Self {
        Self {
            title: f.title.clone(),
            impact: f.impact,
            effort: "low".to_string(),
        }
    }
}

/// Order by `(severity rank, impact)` descending. The sort is stable: equal keys keep insertion order.
pub fn prioritize(mut findings: Vec<Finding>) -> Vec<Finding> {
    findings.sort_by(|a, b| {
        b.severity
            .rank()
            .cmp(&a.severity.rank())
            .then_with(|| b.impact.total_cmp(&a.impact))
    });
    findings
}

/// The top `count` findings of an already prioritized list.
pub fn quick_wins(findings: &[Finding], count: usize) -> Vec<QuickWin> {
    findings.iter().take(count).map(QuickWin::from).collect()
}
