//! Post-processing of simulation runs: KPIs, correlations and sensitivity studies.

pub mod correlation;
pub mod kpi;
pub mod sensitivity;

pub use correlation::{pearson, CorrelationMatrix};
pub use kpi::{calculate_kpis, Kpi, KpiSet};
pub use sensitivity::{
    Override, ParameterSweep, RunOutcome, SensitivityResult, SensitivityRun, SensitivityRunner,
    SweepParameter, UnknownParameter,
};

use serde::Serialize;

use crate::bioprocess::{simulate_with_profile, EnvironmentProfile, SetpointProfile};
use crate::config::ParameterSet;
use crate::state::TimeSeries;

/// Parameters, trajectory and KPIs of one complete run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRun {
    pub parameters: ParameterSet,
    pub series: TimeSeries,
    pub kpis: KpiSet,
}

impl SimulationRun {
    /// Simulate at the parameter set's own setpoints and reduce to KPIs
    pub fn execute(parameters: ParameterSet) -> Self {
        let profile = SetpointProfile::from_parameters(&parameters);
        Self::execute_with_profile(parameters, &profile)
    }

    /// Same pipeline with a caller-supplied environment profile
    pub fn execute_with_profile(parameters: ParameterSet, profile: &dyn EnvironmentProfile) -> Self {
        let series = simulate_with_profile(&parameters, profile);
        let kpis = KpiSet::from_series(&series);
        Self {
            parameters,
            series,
            kpis,
        }
    }
}
