//! # IO Module
//!
//! File contracts between the stages. Every writer serializes fully in memory
//! before touching the filesystem, and a write that fails midway removes the
//! files already written, so a failing run leaves no partial output.

pub mod tables;

pub use tables::{
    load_match, notes_to_csv, read_events, read_notes, read_rounds, EVENTS_REQUIRED_COLUMNS,
    NOTES_COLUMNS, ROUNDS_REQUIRED_COLUMNS,
};

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{AnalyticsError, Result};
use crate::kpi::{KpiOutput, KpiReport};

pub const KPIS_FILE: &str = "kpis_team.json";
pub const NOTES_FILE: &str = "per_round.csv";
pub const FEEDBACK_FILE: &str = "feedback.json";

pub fn to_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AnalyticsError::io(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| AnalyticsError::io(path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote output");
    Ok(())
}

/// Write every `(path, bytes)` pair, or none of them.
///
/// When a write fails, the files written earlier in this call are removed
/// before the error is returned.
pub fn write_all(files: &[(PathBuf, Vec<u8>)]) -> Result<()> {
    for (i, (path, bytes)) in files.iter().enumerate() {
        if let Err(err) = write_file(path, bytes) {
            for (written, _) in &files[..i] {
                if let Err(e) = fs::remove_file(written) {
                    warn!(path = %written.display(), error = %e, "could not remove partial output");
                }
            }
            return Err(err);
        }
    }
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|e| AnalyticsError::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}

pub fn read_kpis(path: &Path) -> Result<KpiReport> {
    read_json(path)
}

/// Paths written by the KPI stage.
#[derive(Debug, Clone)]
pub struct KpiArtifacts {
    pub kpis: PathBuf,
    pub notes: PathBuf,
}

impl KpiArtifacts {
    pub fn in_dir(out_dir: &Path) -> Self {
        Self {
            kpis: out_dir.join(KPIS_FILE),
            notes: out_dir.join(NOTES_FILE),
        }
    }
}

/// Serialized `kpis_team.json` and `per_round.csv`, ready for [`write_all`].
pub fn kpi_output_files(
    artifacts: &KpiArtifacts,
    output: &KpiOutput,
) -> Result<Vec<(PathBuf, Vec<u8>)>> {
    Ok(vec![
        (artifacts.kpis.clone(), to_json_bytes(&output.kpis)?),
        (artifacts.notes.clone(), notes_to_csv(&output.notes)?),
    ])
}

/// Write `kpis_team.json` and `per_round.csv` into `out_dir`.
pub fn write_kpi_outputs(out_dir: &Path, output: &KpiOutput) -> Result<KpiArtifacts> {
    let artifacts = KpiArtifacts::in_dir(out_dir);
    write_all(&kpi_output_files(&artifacts, output)?)?;
    Ok(artifacts)
}
