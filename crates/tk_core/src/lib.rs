//! # tk_core - Tactical KPI and Coaching Feedback Engine
//!
//! Batch analytics over one completed team-shooter match log:
//! - `zone` - layered polygon zone classification
//! - `kpi` - trade rate, flash effectiveness, utility damage, post-plant collapse, entry duels, per-round notes
//! - `feedback` - threshold-driven findings, quick wins, 0-100 scores
//! - `io` - CSV/JSON/YAML file contracts between the stages
//!
//! Every stage is a pure function of its inputs and configuration; identical
//! inputs produce byte-identical outputs.

pub mod config;
pub mod error;
pub mod feedback;
pub mod io;
pub mod kpi;
pub mod models;
pub mod zone;

pub use config::{EngineConfig, NoteTradeRule};
pub use error::{AnalyticsError, Result};
pub use feedback::{generate, FeedbackReport, Finding, Severity, Thresholds};
pub use kpi::{KpiEngine, KpiOutput, KpiReport, RoundNote};
pub use models::{Event, EventKind, MatchData, RoundRow, Side};
pub use zone::{ZoneConfig, ZoneIndex};
