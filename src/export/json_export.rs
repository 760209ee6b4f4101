//! JSON reports for single runs and sensitivity studies.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use crate::analysis::{SensitivityResult, SimulationRun};

/// Report format version
pub const REPORT_VERSION: &str = "1.0.0";

/// Envelope around any exported payload
#[derive(Debug, Clone, Serialize)]
pub struct ReportExport<'a, T: Serialize> {
    /// Export timestamp
    pub exported_at: String,
    /// Export version for compatibility
    pub version: &'static str,
    /// Report kind ("run" or "sensitivity")
    pub kind: &'static str,
    pub payload: &'a T,
}

impl<'a, T: Serialize> ReportExport<'a, T> {
    fn new(kind: &'static str, payload: &'a T) -> Self {
        Self {
            exported_at: Local::now().to_rfc3339(),
            version: REPORT_VERSION,
            kind,
            payload,
        }
    }
}

/// Export a run (parameters, series, KPIs) to `dir`
///
/// Filename is auto-generated with timestamp: `run_YYYYMMDD_HHMMSS.json`
pub fn export_run_json<P: AsRef<Path>>(run: &SimulationRun, dir: P) -> Result<PathBuf> {
    let path = timestamped_path(dir.as_ref(), "run")?;
    export_run_json_to(run, &path)?;
    Ok(path)
}

/// Export a run to a specific file
pub fn export_run_json_to(run: &SimulationRun, path: &Path) -> Result<()> {
    write_pretty(path, &ReportExport::new("run", run))?;
    log::info!("Run report exported: {}", path.display());
    Ok(())
}

/// Export a sensitivity study to `dir`
pub fn export_sensitivity_json<P: AsRef<Path>>(result: &SensitivityResult, dir: P) -> Result<PathBuf> {
    let path = timestamped_path(dir.as_ref(), "sensitivity")?;
    export_sensitivity_json_to(result, &path)?;
    Ok(path)
}

/// Export a sensitivity study to a specific file
pub fn export_sensitivity_json_to(result: &SensitivityResult, path: &Path) -> Result<()> {
    write_pretty(path, &ReportExport::new("sensitivity", result))?;
    log::info!("Sensitivity report exported: {}", path.display());
    Ok(())
}

fn timestamped_path(dir: &Path, prefix: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    Ok(dir.join(format!("{}_{}.json", prefix, timestamp)))
}

fn write_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}
