//! CSV export of time series and sensitivity runs.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use crate::analysis::{Kpi, SensitivityResult};
use crate::state::{ClampFlags, SimulationState, TimeSeries};

/// One CSV row per recorded hour
#[derive(Debug, Clone, Serialize)]
pub struct TimeSeriesRecord {
    /// Culture time (h)
    pub time_h: f64,
    /// Culture time (days)
    pub time_days: f64,
    /// Viable cell density (cells/mL)
    pub viable_density: f64,
    /// Dead cell density (cells/mL)
    pub dead_density: f64,
    /// Total cell density (cells/mL)
    pub total_density: f64,
    /// Viability (%)
    pub viability_percent: f64,
    /// Substrate concentration
    pub substrate: f64,
    /// Product titer
    pub product: f64,
    /// A component was truncated at zero in the interval ending here
    pub clamped: bool,
}

impl TimeSeriesRecord {
    pub fn new(state: &SimulationState, clamp: &ClampFlags) -> Self {
        Self {
            time_h: state.time_h,
            time_days: state.time_h / 24.0,
            viable_density: state.Xv,
            dead_density: state.Xd,
            total_density: state.total_density(),
            viability_percent: state.viability() * 100.0,
            substrate: state.S,
            product: state.P,
            clamped: clamp.any(),
        }
    }
}

/// CSV exporter for a run's time series
///
/// Writes every `sample_interval_h`-th hour; the final sample is always
/// written so the table ends at the horizon.
pub struct CsvExporter {
    writer: csv::Writer<File>,
    /// Sample interval in hours
    sample_interval_h: usize,
    /// Path to output file
    path: PathBuf,
}

impl CsvExporter {
    /// Create an exporter writing into `dir`
    ///
    /// Creates the directory if it doesn't exist.
    /// Filename is auto-generated with timestamp.
    pub fn new<P: AsRef<Path>>(dir: P, sample_interval_h: usize) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("timeseries_{}.csv", timestamp));
        Self::to_path(path, sample_interval_h)
    }

    /// Create an exporter writing to an explicit file
    pub fn to_path<P: Into<PathBuf>>(path: P, sample_interval_h: usize) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path)?;
        let writer = csv::Writer::from_writer(file);

        log::info!("CSV export started: {}", path.display());

        Ok(Self {
            writer,
            sample_interval_h: sample_interval_h.max(1),
            path,
        })
    }

    /// Write the sampled rows of a series
    pub fn write_series(&mut self, series: &TimeSeries) -> Result<usize> {
        write_records(&mut self.writer, series, self.sample_interval_h)
    }

    /// Finish writing and return the output path
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        log::info!("CSV export completed: {}", self.path.display());
        Ok(self.path)
    }

    /// Get the output path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write every hour of a series to any writer
pub fn write_time_series_csv<W: Write>(series: &TimeSeries, writer: W) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    let written = write_records(&mut writer, series, 1)?;
    writer.flush()?;
    Ok(written)
}

fn write_records<W: Write>(
    writer: &mut csv::Writer<W>,
    series: &TimeSeries,
    interval: usize,
) -> Result<usize> {
    let last = series.len().saturating_sub(1);
    let mut written = 0;
    for (i, (state, clamp)) in series
        .samples()
        .iter()
        .zip(series.clamp_flags())
        .enumerate()
    {
        if i % interval == 0 || i == last {
            writer.serialize(TimeSeriesRecord::new(state, clamp))?;
            written += 1;
        }
    }
    Ok(written)
}

/// One row per sensitivity run: override, status, KPIs, error message
pub fn write_sensitivity_csv<W: Write>(result: &SensitivityResult, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec!["parameter".to_string(), "value".to_string(), "status".to_string()];
    header.extend(Kpi::ALL.iter().map(|kpi| kpi.name().to_string()));
    header.push("error".to_string());
    writer.write_record(&header)?;

    for run in &result.runs {
        let mut record = vec![
            run.override_.parameter.name().to_string(),
            run.override_.value.to_string(),
        ];
        match (run.kpis(), run.error()) {
            (Some(kpis), _) => {
                record.push("completed".to_string());
                record.extend(Kpi::ALL.iter().map(|&kpi| kpis.get(kpi).to_string()));
                record.push(String::new());
            }
            (None, error) => {
                record.push("failed".to_string());
                record.extend(Kpi::ALL.iter().map(|_| String::new()));
                record.push(error.map(ToString::to_string).unwrap_or_default());
            }
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Export a sensitivity study to `dir` with a timestamped filename
pub fn export_sensitivity_csv<P: AsRef<Path>>(result: &SensitivityResult, dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("sensitivity_{}.csv", timestamp));
    write_sensitivity_csv(result, File::create(&path)?)?;

    log::info!("Sensitivity CSV exported: {}", path.display());
    Ok(path)
}
