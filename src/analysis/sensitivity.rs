//! One-at-a-time sensitivity studies.
//!
//! Each override changes a single parameter of the base set and leaves every
//! other value at its base. Runs share no state, so they fan out over a rayon
//! pool and are gathered back in the order the overrides were declared. Only
//! the final correlation assembly sees the whole ensemble.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bioprocess::simulate;
use crate::config::{ParameterSet, SimulationParameters, ValidationError};

use super::correlation::CorrelationMatrix;
use super::kpi::{Kpi, KpiSet};

/// Parameters that can be swept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SweepParameter {
    #[serde(rename = "mu_max")]
    MuMax,
    #[serde(rename = "Ks")]
    Ks,
    #[serde(rename = "Ki")]
    Ki,
    #[serde(rename = "kd_base")]
    KdBase,
    #[serde(rename = "Yxs")]
    Yxs,
    #[serde(rename = "qp")]
    Qp,
    #[serde(rename = "temperature")]
    Temperature,
    #[serde(rename = "ph")]
    Ph,
    #[serde(rename = "dissolved_oxygen")]
    DissolvedOxygen,
    #[serde(rename = "glucose")]
    Glucose,
    #[serde(rename = "initial_viable_density")]
    InitialViableDensity,
    #[serde(rename = "initial_substrate")]
    InitialSubstrate,
}

impl SweepParameter {
    pub const ALL: [SweepParameter; 12] = [
        SweepParameter::MuMax,
        SweepParameter::Ks,
        SweepParameter::Ki,
        SweepParameter::KdBase,
        SweepParameter::Yxs,
        SweepParameter::Qp,
        SweepParameter::Temperature,
        SweepParameter::Ph,
        SweepParameter::DissolvedOxygen,
        SweepParameter::Glucose,
        SweepParameter::InitialViableDensity,
        SweepParameter::InitialSubstrate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SweepParameter::MuMax => "mu_max",
            SweepParameter::Ks => "Ks",
            SweepParameter::Ki => "Ki",
            SweepParameter::KdBase => "kd_base",
            SweepParameter::Yxs => "Yxs",
            SweepParameter::Qp => "qp",
            SweepParameter::Temperature => "temperature",
            SweepParameter::Ph => "ph",
            SweepParameter::DissolvedOxygen => "dissolved_oxygen",
            SweepParameter::Glucose => "glucose",
            SweepParameter::InitialViableDensity => "initial_viable_density",
            SweepParameter::InitialSubstrate => "initial_substrate",
        }
    }

    /// Write `value` into the raw parameters.
    ///
    /// Environmental parameters override the operating `current_value`.
    pub fn apply(self, params: &mut SimulationParameters, value: f64) {
        match self {
            SweepParameter::MuMax => params.kinetics.mu_max_per_h = value,
            SweepParameter::Ks => params.kinetics.Ks = value,
            SweepParameter::Ki => params.kinetics.Ki = Some(value),
            SweepParameter::KdBase => params.kinetics.kd_base_per_h = value,
            SweepParameter::Yxs => params.kinetics.Yxs = value,
            SweepParameter::Qp => params.kinetics.qp = value,
            SweepParameter::Temperature => params.environment.temperature_C.current_value = value,
            SweepParameter::Ph => params.environment.ph.current_value = value,
            SweepParameter::DissolvedOxygen => {
                params.environment.dissolved_oxygen_percent.current_value = value
            }
            SweepParameter::Glucose => params.environment.glucose.current_value = value,
            SweepParameter::InitialViableDensity => params.initial.Xv0 = value,
            SweepParameter::InitialSubstrate => params.initial.S0 = value,
        }
    }

    /// Current value in the raw parameters; `None` for an unset `Ki`
    pub fn value_of(self, params: &SimulationParameters) -> Option<f64> {
        match self {
            SweepParameter::MuMax => Some(params.kinetics.mu_max_per_h),
            SweepParameter::Ks => Some(params.kinetics.Ks),
            SweepParameter::Ki => params.kinetics.Ki,
            SweepParameter::KdBase => Some(params.kinetics.kd_base_per_h),
            SweepParameter::Yxs => Some(params.kinetics.Yxs),
            SweepParameter::Qp => Some(params.kinetics.qp),
            SweepParameter::Temperature => Some(params.environment.temperature_C.current_value),
            SweepParameter::Ph => Some(params.environment.ph.current_value),
            SweepParameter::DissolvedOxygen => {
                Some(params.environment.dissolved_oxygen_percent.current_value)
            }
            SweepParameter::Glucose => Some(params.environment.glucose.current_value),
            SweepParameter::InitialViableDensity => Some(params.initial.Xv0),
            SweepParameter::InitialSubstrate => Some(params.initial.S0),
        }
    }
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameter name not recognised by [`SweepParameter::from_str`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sweep parameter '{0}'")]
pub struct UnknownParameter(pub String);

impl FromStr for SweepParameter {
    type Err = UnknownParameter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SweepParameter::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownParameter(wanted.to_string()))
    }
}

/// Ordered list of values for one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSweep {
    pub parameter: SweepParameter,
    pub values: Vec<f64>,
}

impl ParameterSweep {
    pub fn new(parameter: SweepParameter, values: impl Into<Vec<f64>>) -> Self {
        Self {
            parameter,
            values: values.into(),
        }
    }
}

/// Single one-at-a-time override
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Override {
    pub parameter: SweepParameter,
    pub value: f64,
}

/// Result of one override
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed { kpis: KpiSet },
    Failed { error: ValidationError },
}

/// One run of a study, kept in declaration order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityRun {
    #[serde(rename = "override")]
    pub override_: Override,
    /// Effective raw parameters of the run
    pub parameters: SimulationParameters,
    pub outcome: RunOutcome,
}

impl SensitivityRun {
    pub fn kpis(&self) -> Option<&KpiSet> {
        match &self.outcome {
            RunOutcome::Completed { kpis } => Some(kpis),
            RunOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match &self.outcome {
            RunOutcome::Completed { .. } => None,
            RunOutcome::Failed { error } => Some(error),
        }
    }
}

/// Complete study: runs plus correlation matrices over the completed ones
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityResult {
    pub runs: Vec<SensitivityRun>,
    /// Swept parameters × KPIs, pooled over every completed run of the
    /// study; runs of other sweeps enter a parameter's column at its base value
    pub parameter_kpi: CorrelationMatrix,
    /// KPIs × KPIs
    pub kpi_kpi: CorrelationMatrix,
}

impl SensitivityResult {
    pub fn completed(&self) -> impl Iterator<Item = &SensitivityRun> {
        self.runs.iter().filter(|run| run.kpis().is_some())
    }

    pub fn failures(&self) -> impl Iterator<Item = &SensitivityRun> {
        self.runs.iter().filter(|run| run.error().is_some())
    }

    /// KPI values of the completed runs of one sweep, in declaration order
    pub fn kpi_series(&self, parameter: SweepParameter, kpi: Kpi) -> Vec<(f64, f64)> {
        self.runs
            .iter()
            .filter(|run| run.override_.parameter == parameter)
            .filter_map(|run| run.kpis().map(|k| (run.override_.value, k.get(kpi))))
            .collect()
    }

    /// Correlation between a swept parameter and a KPI
    pub fn correlation(&self, parameter: SweepParameter, kpi: Kpi) -> Option<f64> {
        self.parameter_kpi.get(parameter.name(), kpi.name())
    }
}

/// Builder and executor of a one-at-a-time study
#[derive(Debug, Clone)]
pub struct SensitivityRunner {
    base: ParameterSet,
    sweeps: Vec<ParameterSweep>,
    threads: Option<usize>,
}

impl SensitivityRunner {
    pub fn new(base: ParameterSet) -> Self {
        Self {
            base,
            sweeps: Vec::new(),
            threads: None,
        }
    }

    /// Add a sweep; values are run in the order given
    pub fn sweep(mut self, parameter: SweepParameter, values: impl Into<Vec<f64>>) -> Self {
        self.sweeps.push(ParameterSweep::new(parameter, values));
        self
    }

    pub fn with_sweeps(mut self, sweeps: impl IntoIterator<Item = ParameterSweep>) -> Self {
        self.sweeps.extend(sweeps);
        self
    }

    /// Run on a dedicated pool of `threads` workers instead of the global pool
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Flattened overrides in declaration order
    pub fn overrides(&self) -> Vec<Override> {
        self.sweeps
            .iter()
            .flat_map(|sweep| {
                sweep.values.iter().map(move |&value| Override {
                    parameter: sweep.parameter,
                    value,
                })
            })
            .collect()
    }

    /// Execute every override and assemble the correlation matrices
    pub fn run(&self) -> SensitivityResult {
        let overrides = self.overrides();
        log::info!(
            "Sensitivity study: {} runs over {} sweeps",
            overrides.len(),
            self.sweeps.len()
        );

        let runs = match self.threads.map(build_pool) {
            Some(Some(pool)) => pool.install(|| self.fan_out(&overrides)),
            _ => self.fan_out(&overrides),
        };

        for run in runs.iter() {
            if let Some(error) = run.error() {
                log::warn!(
                    "Override {} = {} rejected: {}",
                    run.override_.parameter,
                    run.override_.value,
                    error
                );
            }
        }

        let parameter_kpi = CorrelationMatrix::between(
            &parameter_columns(&self.sweeps, &runs),
            &kpi_columns(&runs),
        );
        let kpi_kpi = CorrelationMatrix::symmetric(&kpi_columns(&runs));

        SensitivityResult {
            runs,
            parameter_kpi,
            kpi_kpi,
        }
    }

    fn fan_out(&self, overrides: &[Override]) -> Vec<SensitivityRun> {
        // Indexed collect keeps declaration order
        overrides
            .par_iter()
            .map(|&override_| run_override(self.base.parameters(), override_))
            .collect()
    }
}

fn build_pool(threads: usize) -> Option<rayon::ThreadPool> {
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            log::warn!("Failed to build {}-thread pool: {}, using global pool", threads, e);
            None
        }
    }
}

/// Apply one override to the base and run the full pipeline
pub fn run_override(base: &SimulationParameters, override_: Override) -> SensitivityRun {
    let mut parameters = base.clone();
    override_.parameter.apply(&mut parameters, override_.value);

    let outcome = match ParameterSet::new(parameters.clone()) {
        Ok(params) => RunOutcome::Completed {
            kpis: KpiSet::from_series(&simulate(&params)),
        },
        Err(error) => RunOutcome::Failed { error },
    };

    SensitivityRun {
        override_,
        parameters,
        outcome,
    }
}

/// One column per distinct swept parameter, over completed runs
fn parameter_columns(sweeps: &[ParameterSweep], runs: &[SensitivityRun]) -> Vec<(String, Vec<f64>)> {
    let mut seen: Vec<SweepParameter> = Vec::new();
    for sweep in sweeps {
        if !seen.contains(&sweep.parameter) {
            seen.push(sweep.parameter);
        }
    }

    seen.into_iter()
        .map(|parameter| {
            let column = runs
                .iter()
                .filter(|run| run.kpis().is_some())
                .map(|run| parameter.value_of(&run.parameters).unwrap_or(f64::NAN))
                .collect();
            (parameter.name().to_string(), column)
        })
        .collect()
}

/// One column per KPI, over completed runs
fn kpi_columns(runs: &[SensitivityRun]) -> Vec<(String, Vec<f64>)> {
    Kpi::ALL
        .iter()
        .map(|&kpi| {
            let column = runs
                .iter()
                .filter_map(|run| run.kpis().map(|k| k.get(kpi)))
                .collect();
            (kpi.name().to_string(), column)
        })
        .collect()
}
