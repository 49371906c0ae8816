//! Advisory targets the feedback stage compares KPIs against.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub global: f64,
}

/// `thresholds.yml`. A KPI without an entry gets no finding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default)]
    pub trade_rate_5s_target: Option<ThresholdEntry>,
    #[serde(default)]
    pub flash_effectiveness_target: Option<ThresholdEntry>,
    #[serde(default)]
    pub postplant_early_deaths_max: Option<ThresholdEntry>,
}

impl Thresholds {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // an empty document means "no targets"
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| AnalyticsError::io(path, e))?;
        Self::from_yaml_str(&text)
    }

    pub fn trade_rate_target(&self) -> Option<f64> {
        self.trade_rate_5s_target.map(|t| t.global)
    }

    pub fn flash_effectiveness_target(&self) -> Option<f64> {
        self.flash_effectiveness_target.map(|t| t.global)
    }

    pub fn postplant_early_deaths_max(&self) -> Option<f64> {
        self.postplant_early_deaths_max.map(|t| t.global)
    }
}
