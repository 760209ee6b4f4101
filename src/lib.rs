//! CHO Fermentation Simulator - batch cell-culture process model
//!
//! This library simulates viable/dead cell density, substrate and antibody
//! titer over a batch run under environmental stress, reduces runs to KPIs,
//! and correlates KPIs with parameters across sensitivity studies.

// Allow non-snake-case for the conventional bioprocess symbols (Xv, Ks, Yxs, ...)
// and unit suffixes in field names (temperature_C).
#![allow(non_snake_case)]

pub mod analysis;
pub mod bioprocess;
pub mod config;
pub mod export;
pub mod state;

pub use analysis::{
    calculate_kpis, CorrelationMatrix, Kpi, KpiSet, SensitivityResult, SensitivityRunner,
    SimulationRun, SweepParameter,
};
pub use bioprocess::{
    simulate, simulate_with_profile, EnvironmentProfile, KineticModel, StressModel,
};
pub use config::{ParameterSet, SimulationParameters, ValidationError};
pub use state::{SimulationState, TimeSeries};
