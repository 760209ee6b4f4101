//! Export functionality for simulation results.
//!
//! Provides CSV time-series and sensitivity tables plus JSON run and study
//! reports. Everything here consumes the engine's output types verbatim; the
//! engine itself never touches the filesystem.

mod csv_export;
mod json_export;

pub use csv_export::{
    export_sensitivity_csv, write_sensitivity_csv, write_time_series_csv, CsvExporter,
    TimeSeriesRecord,
};
pub use json_export::{
    export_run_json, export_run_json_to, export_sensitivity_json, export_sensitivity_json_to,
    ReportExport, REPORT_VERSION,
};
