//! Event rows from the adapter's events table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which half of the objective a player is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    T,
    CT,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::T => "T",
            Side::CT => "CT",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "T" | "TERRORIST" | "TERRORISTS" => Ok(Side::T),
            "CT" | "COUNTERTERRORIST" | "COUNTERTERRORISTS" => Ok(Side::CT),
            other => Err(format!("unknown side '{}'", other)),
        }
    }
}

/// Kind column of an event row. Unknown kinds are kept verbatim and ignored by the KPIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Kill,
    Flash,
    NadeDamage,
    Other(String),
}

impl EventKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "kill" => EventKind::Kill,
            "flash" => EventKind::Flash,
            "nade_damage" => EventKind::NadeDamage,
            other => EventKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Kill => "kill",
            EventKind::Flash => "flash",
            EventKind::NadeDamage => "nade_damage",
            EventKind::Other(s) => s,
        }
    }
}

/// One in-match occurrence. Optional numeric cells are already defaulted to 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub match_id: String,
    pub round: i64,
    /// Seconds, relative to round start
    pub ts: f64,
    pub kind: EventKind,
    pub killer: Option<String>,
    pub victim: Option<String>,
    pub team_killer: Option<String>,
    pub team_victim: Option<String>,
    pub side_killer: Option<Side>,
    pub side_victim: Option<Side>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub flashed_enemies: u32,
    pub is_flash_assist: bool,
    pub nade_damage: f64,
    pub map_name: String,
}

impl Event {
    pub fn new(match_id: impl Into<String>, round: i64, ts: f64, kind: EventKind) -> Self {
        Self {
            match_id: match_id.into(),
            round,
            ts,
            kind,
            killer: None,
            victim: None,
            team_killer: None,
            team_victim: None,
            side_killer: None,
            side_victim: None,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            flashed_enemies: 0,
            is_flash_assist: false,
            nade_damage: 0.0,
            map_name: String::new(),
        }
    }

    /// Kill row shorthand: `killer` of `team_killer` kills `victim` of `team_victim`.
    pub fn kill(
        match_id: impl Into<String>,
        round: i64,
        ts: f64,
        (killer, team_killer): (&str, &str),
        (victim, team_victim): (&str, &str),
    ) -> Self {
        let mut ev = Self::new(match_id, round, ts, EventKind::Kill);
        ev.killer = Some(killer.to_string());
        ev.team_killer = Some(team_killer.to_string());
        ev.victim = Some(victim.to_string());
        ev.team_victim = Some(team_victim.to_string());
        ev
    }

    pub fn with_sides(mut self, side_killer: Side, side_victim: Side) -> Self {
        self.side_killer = Some(side_killer);
        self.side_victim = Some(side_victim);
        self
    }

    pub fn with_position(mut self, x: f64, y: f64, z: f64) -> Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }

    pub fn with_flashed_enemies(mut self, count: u32) -> Self {
        self.flashed_enemies = count;
        self
    }

    pub fn with_flash_assist(mut self) -> Self {
        self.is_flash_assist = true;
        self
    }

    pub fn with_nade_damage(mut self, damage: f64) -> Self {
        self.nade_damage = damage;
        self
    }

    pub fn is_kill(&self) -> bool {
        self.kind == EventKind::Kill
    }

    pub fn is_flash(&self) -> bool {
        self.kind == EventKind::Flash
    }

    /// Killer and victim on different teams. Rows with a missing team never count as a duel.
    pub fn is_cross_team(&self) -> bool {
        match (&self.team_killer, &self.team_victim) {
            (Some(k), Some(v)) => k != v,
            _ => false,
        }
    }

    pub fn round_key(&self) -> (&str, i64) {
        (self.match_id.as_str(), self.round)
    }
}
