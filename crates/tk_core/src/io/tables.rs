//! CSV tables: events and rounds in, per-round notes in and out.
//!
//! Required columns are checked from the header row before any row is parsed,
//! and every missing column is reported at once.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use crate::error::{AnalyticsError, Result};
use crate::kpi::RoundNote;
use crate::models::{Event, EventKind, MatchData, RoundRow, Side};

pub const EVENTS_REQUIRED_COLUMNS: [&str; 17] = [
    "match_id",
    "round",
    "ts",
    "event",
    "team_killer",
    "team_victim",
    "side_killer",
    "side_victim",
    "killer",
    "victim",
    "is_flash_assist",
    "flashed_enemies",
    "nade_damage",
    "x",
    "y",
    "z",
    "map_name",
];

pub const ROUNDS_REQUIRED_COLUMNS: [&str; 3] = ["match_id", "round", "plant_ts"];

pub const NOTES_COLUMNS: [&str; 3] = ["match_id", "round", "note"];

/// Header name → column position, after verifying `required` are all present.
struct Columns {
    table: &'static str,
    positions: HashMap<String, usize>,
}

impl Columns {
    fn resolve(table: &'static str, headers: &StringRecord, required: &[&str]) -> Result<Self> {
        let positions: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().trim_start_matches('\u{feff}').to_string(), i))
            .collect();

        let missing: Vec<String> = required
            .iter()
            .filter(|c| !positions.contains_key(**c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AnalyticsError::MissingColumns {
                table: table.to_string(),
                missing,
            });
        }

        Ok(Self { table, positions })
    }

    fn cell<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
        self.positions
            .get(column)
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }
}

/// Row context for error messages.
struct Row<'a> {
    columns: &'a Columns,
    record: &'a StringRecord,
    line: u64,
}

impl Row<'_> {
    fn invalid(&self, column: &str, raw: &str, expected: &str) -> AnalyticsError {
        AnalyticsError::InvalidRow {
            table: self.columns.table.to_string(),
            row: self.line,
            message: format!("column '{}' = '{}' is not {}", column, raw, expected),
        }
    }

    fn raw(&self, column: &str) -> &str {
        self.columns.cell(self.record, column)
    }

    /// Empty cells and NaN/null markers read as absent.
    fn optional(&self, column: &str) -> Option<&str> {
        let raw = self.raw(column);
        if is_blank(raw) {
            None
        } else {
            Some(raw)
        }
    }

    fn text(&self, column: &str) -> Option<String> {
        self.optional(column).map(str::to_string)
    }

    fn required_text(&self, column: &str) -> Result<String> {
        self.text(column)
            .ok_or_else(|| self.invalid(column, "", "a non-empty value"))
    }

    fn float_or(&self, column: &str, default: f64) -> Result<f64> {
        match self.optional(column) {
            None => Ok(default),
            Some(raw) => {
                let v: f64 = raw
                    .parse()
                    .map_err(|_| self.invalid(column, raw, "a number"))?;
                if v.is_finite() {
                    Ok(v)
                } else {
                    Err(self.invalid(column, raw, "a finite number"))
                }
            }
        }
    }

    fn optional_float(&self, column: &str) -> Result<Option<f64>> {
        match self.optional(column) {
            None => Ok(None),
            Some(_) => self.float_or(column, 0.0).map(Some),
        }
    }

    fn required_float(&self, column: &str) -> Result<f64> {
        match self.optional(column) {
            None => Err(self.invalid(column, "", "a number")),
            Some(_) => self.float_or(column, 0.0),
        }
    }

    /// Integers, also accepting integral floats such as `3.0`.
    fn integer(&self, column: &str) -> Result<Option<i64>> {
        let Some(raw) = self.optional(column) else {
            return Ok(None);
        };
        if let Ok(v) = raw.parse::<i64>() {
            return Ok(Some(v));
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(Some(v as i64)),
            _ => Err(self.invalid(column, raw, "an integer")),
        }
    }

    fn required_integer(&self, column: &str) -> Result<i64> {
        self.integer(column)?
            .ok_or_else(|| self.invalid(column, "", "an integer"))
    }

    fn count(&self, column: &str) -> Result<u32> {
        match self.integer(column)? {
            None => Ok(0),
            Some(v) => u32::try_from(v)
                .map_err(|_| self.invalid(column, self.raw(column), "a count >= 0")),
        }
    }

    fn flag(&self, column: &str) -> Result<bool> {
        let Some(raw) = self.optional(column) else {
            return Ok(false);
        };
        match raw.to_ascii_lowercase().as_str() {
            "true" | "t" | "1" | "1.0" | "yes" | "y" => Ok(true),
            "false" | "f" | "0" | "0.0" | "no" | "n" => Ok(false),
            _ => Err(self.invalid(column, raw, "a boolean")),
        }
    }

    fn side(&self, column: &str) -> Option<Side> {
        let raw = self.optional(column)?;
        match raw.parse::<Side>() {
            Ok(side) => Some(side),
            Err(reason) => {
                warn!(table = self.columns.table, row = self.line, column, %reason, "ignoring side label");
                None
            }
        }
    }
}

fn is_blank(raw: &str) -> bool {
    raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("null")
}

fn open_reader(path: &Path) -> Result<csv::Reader<fs::File>> {
    let file = fs::File::open(path).map_err(|e| AnalyticsError::io(path, e))?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file))
}

fn parse_event(row: &Row) -> Result<Event> {
    let ts = row.required_float("ts")?;
    let nade_damage = row.float_or("nade_damage", 0.0)?;
    if nade_damage < 0.0 {
        return Err(row.invalid("nade_damage", row.raw("nade_damage"), "a damage value >= 0"));
    }

    Ok(Event {
        match_id: row.required_text("match_id")?,
        round: row.required_integer("round")?,
        ts,
        kind: EventKind::parse(row.raw("event")),
        killer: row.text("killer"),
        victim: row.text("victim"),
        team_killer: row.text("team_killer"),
        team_victim: row.text("team_victim"),
        side_killer: row.side("side_killer"),
        side_victim: row.side("side_victim"),
        x: row.float_or("x", 0.0)?,
        y: row.float_or("y", 0.0)?,
        z: row.float_or("z", 0.0)?,
        flashed_enemies: row.count("flashed_enemies")?,
        is_flash_assist: row.flag("is_flash_assist")?,
        nade_damage,
        map_name: row.text("map_name").unwrap_or_default(),
    })
}

/// Read the events table. Fails before parsing any row if a required column is absent.
pub fn read_events(path: &Path) -> Result<Vec<Event>> {
    let mut reader = open_reader(path)?;
    let columns = Columns::resolve("events", reader.headers()?, &EVENTS_REQUIRED_COLUMNS)?;

    let mut events = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        events.push(parse_event(&Row {
            columns: &columns,
            record: &record,
            line,
        })?);
    }
    Ok(events)
}

/// Read the rounds table. `(match_id, round)` must be unique.
pub fn read_rounds(path: &Path) -> Result<Vec<RoundRow>> {
    let mut reader = open_reader(path)?;
    let columns = Columns::resolve("rounds", reader.headers()?, &ROUNDS_REQUIRED_COLUMNS)?;

    let mut seen = BTreeSet::new();
    let mut rounds = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let row = Row {
            columns: &columns,
            record: &record,
            line,
        };
        let parsed = RoundRow {
            match_id: row.required_text("match_id")?,
            round: row.required_integer("round")?,
            plant_ts: row.optional_float("plant_ts")?,
        };
        if !seen.insert((parsed.match_id.clone(), parsed.round)) {
            return Err(AnalyticsError::InvalidRow {
                table: "rounds".to_string(),
                row: line,
                message: format!(
                    "round {} of match '{}' appears more than once",
                    parsed.round, parsed.match_id
                ),
            });
        }
        rounds.push(parsed);
    }
    Ok(rounds)
}

/// Load and validate both input tables.
pub fn load_match(events: &Path, rounds: &Path) -> Result<MatchData> {
    let data = MatchData::new(read_events(events)?, read_rounds(rounds)?);
    info!(
        events = data.events.len(),
        rounds = data.rounds.len(),
        "input tables loaded"
    );
    Ok(data)
}

/// Read a per-round notes table. A zero-byte file is an empty table.
pub fn read_notes(path: &Path) -> Result<Vec<RoundNote>> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers()?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Ok(Vec::new());
    }
    let columns = Columns::resolve("per_round", &headers, &NOTES_COLUMNS)?;

    let mut notes = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let row = Row {
            columns: &columns,
            record: &record,
            line,
        };
        notes.push(RoundNote {
            match_id: row.required_text("match_id")?,
            round: row.required_integer("round")?,
            note: row.raw("note").to_string(),
        });
    }
    Ok(notes)
}

/// Serialize notes as CSV. The header row is always written.
pub fn notes_to_csv(notes: &[RoundNote]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(NOTES_COLUMNS)?;
    for n in notes {
        let round = n.round.to_string();
        writer.write_record([n.match_id.as_str(), round.as_str(), n.note.as_str()])?;
    }
    writer
        .into_inner()
        .map_err(|e| AnalyticsError::Csv(e.into_error().into()))
}
