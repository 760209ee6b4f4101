//! Parameter structures for a batch fermentation run.
//!
//! `SimulationParameters` is the raw, serde-loadable form. It becomes a
//! [`ParameterSet`] only after validation, and every solver takes the
//! validated form.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::error::{
    require_finite, require_non_negative, require_positive, require_within, ValidationError,
};

/// Simulated horizon of the reference batch (12 days)
pub const DEFAULT_DURATION_H: u32 = 288;
/// Longest accepted horizon (one year)
pub const MAX_DURATION_H: u32 = 24 * 365;
/// Finest accepted step subdivision (one-second Euler steps)
pub const MAX_SUBSTEPS_PER_HOUR: u32 = 3600;

/// Plausible temperature range for mammalian culture (°C)
pub const TEMPERATURE_RANGE_C: (f64, f64) = (0.0, 50.0);
/// pH scale
pub const PH_RANGE: (f64, f64) = (0.0, 14.0);
/// Dissolved oxygen, percent of air saturation
pub const DISSOLVED_OXYGEN_RANGE_PERCENT: (f64, f64) = (0.0, 100.0);
/// Glucose reading (substrate units)
pub const GLUCOSE_RANGE: (f64, f64) = (0.0, 200.0);

/// Top-level raw parameters container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimulationParameters {
    /// Growth, death, yield and productivity constants
    pub kinetics: KineticParameters,
    /// Environmental setpoints and tolerances
    pub environment: EnvironmentParameters,
    /// State at t = 0
    pub initial: InitialConditions,
    /// Model variants
    pub options: ModelOptions,
    /// Horizon and step subdivision
    pub integration: IntegrationSettings,
}

impl SimulationParameters {
    /// Load from JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(params) => {
                    log::info!("Loaded simulation parameters from {:?}", path.as_ref());
                    params
                }
                Err(e) => {
                    log::warn!("Failed to parse simulation parameters: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Simulation parameters file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Load from JSON file, failing on a missing or malformed file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading parameter file {}", path.display()))?;
        let params = serde_json::from_str(&contents)
            .with_context(|| format!("parsing parameter file {}", path.display()))?;
        log::info!("Loaded simulation parameters from {}", path.display());
        Ok(params)
    }

    /// Validate and freeze into a [`ParameterSet`]
    pub fn validate(self) -> Result<ParameterSet, ValidationError> {
        ParameterSet::new(self)
    }
}

/// Kinetic constants of the growth model
///
/// Reference values are typical for CHO batch culture producing a monoclonal
/// antibody (cell densities in cells/mL, substrate in g/L-equivalent units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KineticParameters {
    /// Maximal specific growth rate (1/h)
    #[serde(alias = "mu_max")]
    pub mu_max_per_h: f64,

    /// Substrate half-saturation constant (substrate units)
    pub Ks: f64,

    /// Haldane substrate-inhibition constant; `None` selects plain Monod
    pub Ki: Option<f64>,

    /// Baseline specific death rate (1/h)
    #[serde(alias = "kd_base")]
    pub kd_base_per_h: f64,

    /// Cell yield on substrate (cells per substrate unit)
    pub Yxs: f64,

    /// Specific product formation rate (product units per cell per hour)
    pub qp: f64,
}

impl Default for KineticParameters {
    fn default() -> Self {
        Self {
            mu_max_per_h: 0.035,
            Ks: 0.5,
            Ki: None,
            kd_base_per_h: 0.002,
            Yxs: 2.0e8,
            qp: 1.0e-10,
        }
    }
}

/// One environmental factor: Gaussian optimum, tolerance and actual reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalSetpoint {
    /// Value at which the factor imposes no stress
    pub optimum: f64,
    /// Gaussian σ of the desirability curve
    pub tolerance_width: f64,
    /// Operating value for the run
    pub current_value: f64,
}

impl EnvironmentalSetpoint {
    /// Setpoint operated exactly at its optimum
    pub const fn at_optimum(optimum: f64, tolerance_width: f64) -> Self {
        Self {
            optimum,
            tolerance_width,
            current_value: optimum,
        }
    }

    /// Same curve, different operating value
    pub fn with_current(self, current_value: f64) -> Self {
        Self {
            current_value,
            ..self
        }
    }
}

/// The four environmental factors feeding the stress model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentalFactor {
    Temperature,
    Ph,
    DissolvedOxygen,
    Glucose,
}

impl EnvironmentalFactor {
    /// All factors, in stress-product order
    pub const ALL: [EnvironmentalFactor; 4] = [
        EnvironmentalFactor::Temperature,
        EnvironmentalFactor::Ph,
        EnvironmentalFactor::DissolvedOxygen,
        EnvironmentalFactor::Glucose,
    ];

    /// Field name used in files, sweeps and error messages
    pub fn name(self) -> &'static str {
        match self {
            EnvironmentalFactor::Temperature => "temperature",
            EnvironmentalFactor::Ph => "ph",
            EnvironmentalFactor::DissolvedOxygen => "dissolved_oxygen",
            EnvironmentalFactor::Glucose => "glucose",
        }
    }

    /// Physically plausible range for `current_value`
    pub fn plausible_range(self) -> (f64, f64) {
        match self {
            EnvironmentalFactor::Temperature => TEMPERATURE_RANGE_C,
            EnvironmentalFactor::Ph => PH_RANGE,
            EnvironmentalFactor::DissolvedOxygen => DISSOLVED_OXYGEN_RANGE_PERCENT,
            EnvironmentalFactor::Glucose => GLUCOSE_RANGE,
        }
    }
}

/// Environmental setpoints for CHO culture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentParameters {
    /// Culture temperature (°C)
    #[serde(alias = "temperature")]
    pub temperature_C: EnvironmentalSetpoint,
    /// Medium pH
    pub ph: EnvironmentalSetpoint,
    /// Dissolved oxygen (% air saturation)
    #[serde(alias = "dissolved_oxygen")]
    pub dissolved_oxygen_percent: EnvironmentalSetpoint,
    /// Glucose level (substrate units)
    pub glucose: EnvironmentalSetpoint,
}

impl EnvironmentParameters {
    /// Setpoint for one factor
    pub fn get(&self, factor: EnvironmentalFactor) -> &EnvironmentalSetpoint {
        match factor {
            EnvironmentalFactor::Temperature => &self.temperature_C,
            EnvironmentalFactor::Ph => &self.ph,
            EnvironmentalFactor::DissolvedOxygen => &self.dissolved_oxygen_percent,
            EnvironmentalFactor::Glucose => &self.glucose,
        }
    }

    /// Mutable setpoint for one factor
    pub fn get_mut(&mut self, factor: EnvironmentalFactor) -> &mut EnvironmentalSetpoint {
        match factor {
            EnvironmentalFactor::Temperature => &mut self.temperature_C,
            EnvironmentalFactor::Ph => &mut self.ph,
            EnvironmentalFactor::DissolvedOxygen => &mut self.dissolved_oxygen_percent,
            EnvironmentalFactor::Glucose => &mut self.glucose,
        }
    }
}

impl Default for EnvironmentParameters {
    fn default() -> Self {
        Self {
            temperature_C: EnvironmentalSetpoint::at_optimum(37.0, 2.0),
            ph: EnvironmentalSetpoint::at_optimum(7.1, 0.3),
            dissolved_oxygen_percent: EnvironmentalSetpoint::at_optimum(50.0, 15.0),
            glucose: EnvironmentalSetpoint::at_optimum(4.0, 1.5),
        }
    }
}

/// Culture state at inoculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConditions {
    /// Seed viable cell density (cells/mL)
    pub Xv0: f64,
    /// Dead cell density carried over with the inoculum (cells/mL)
    pub Xd0: f64,
    /// Initial substrate concentration (substrate units)
    pub S0: f64,
    /// Initial product titer
    pub P0: f64,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            Xv0: 5.0e5,
            Xd0: 0.0,
            S0: 4.0,
            P0: 0.0,
        }
    }
}

/// Where the glucose stress factor takes its reading from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GlucoseSource {
    /// Fixed `current_value` of the glucose setpoint
    #[default]
    Setpoint,
    /// Live substrate concentration `S` of the culture
    Substrate,
}

/// How environmental stress raises the death rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeathCoupling {
    /// `kd = kd_base * (1 + (1 - stress))`, bounded by `2 * kd_base`
    #[default]
    Linear,
    /// `kd = kd_base / stress`, unbounded as stress vanishes
    Reciprocal,
}

/// Model variants beyond the reference formulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ModelOptions {
    pub glucose_source: GlucoseSource,
    pub death_coupling: DeathCoupling,
    /// Scale specific productivity by the stress multiplier
    pub product_stress_coupled: bool,
}

/// Integration horizon and step subdivision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationSettings {
    /// Horizon in whole hours; one sample is recorded per hour
    pub duration_h: u32,
    /// Euler steps per recorded hour (1 gives dt = 1 h)
    pub substeps_per_hour: u32,
}

impl IntegrationSettings {
    /// Euler step length (h)
    pub fn dt_h(&self) -> f64 {
        1.0 / f64::from(self.substeps_per_hour)
    }

    /// Number of recorded samples, including t = 0
    pub fn sample_count(&self) -> usize {
        self.duration_h as usize + 1
    }
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            duration_h: DEFAULT_DURATION_H,
            substeps_per_hour: 1,
        }
    }
}

/// Validated, immutable parameter bundle for one run
///
/// The only way to obtain one is through validation, so solvers never
/// re-check invariants.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet {
    inner: SimulationParameters,
}

impl ParameterSet {
    /// Validate raw parameters
    pub fn new(params: SimulationParameters) -> Result<Self, ValidationError> {
        let k = &params.kinetics;
        require_positive("mu_max", k.mu_max_per_h)?;
        require_positive("Ks", k.Ks)?;
        if let Some(ki) = k.Ki {
            require_positive("Ki", ki)?;
        }
        require_non_negative("kd_base", k.kd_base_per_h)?;
        require_positive("Yxs", k.Yxs)?;
        require_positive("qp", k.qp)?;

        for factor in EnvironmentalFactor::ALL {
            let setpoint = params.environment.get(factor);
            let (min, max) = factor.plausible_range();
            require_finite(optimum_field(factor), setpoint.optimum)?;
            require_positive(width_field(factor), setpoint.tolerance_width)?;
            require_within(factor.name(), setpoint.current_value, min, max)?;
        }

        let init = &params.initial;
        require_non_negative("Xv0", init.Xv0)?;
        require_non_negative("Xd0", init.Xd0)?;
        require_non_negative("S0", init.S0)?;
        require_non_negative("P0", init.P0)?;

        let integration = &params.integration;
        if integration.duration_h == 0 {
            return Err(ValidationError::Integrator {
                field: "duration_h",
                message: "horizon must cover at least one hour".to_string(),
            });
        }
        if integration.substeps_per_hour == 0 {
            return Err(ValidationError::Integrator {
                field: "substeps_per_hour",
                message: "at least one Euler step per hour is required".to_string(),
            });
        }
        if integration.duration_h > MAX_DURATION_H {
            return Err(ValidationError::Integrator {
                field: "duration_h",
                message: format!(
                    "horizon of {} h exceeds the {} h limit",
                    integration.duration_h, MAX_DURATION_H
                ),
            });
        }
        if integration.substeps_per_hour > MAX_SUBSTEPS_PER_HOUR {
            return Err(ValidationError::Integrator {
                field: "substeps_per_hour",
                message: format!(
                    "{} steps per hour exceeds the limit of {}",
                    integration.substeps_per_hour, MAX_SUBSTEPS_PER_HOUR
                ),
            });
        }

        Ok(Self { inner: params })
    }

    /// Reference fixture: CHO defaults with every factor at its optimum
    pub fn reference() -> Self {
        Self {
            inner: SimulationParameters::default(),
        }
    }

    pub fn kinetics(&self) -> &KineticParameters {
        &self.inner.kinetics
    }

    pub fn environment(&self) -> &EnvironmentParameters {
        &self.inner.environment
    }

    pub fn initial(&self) -> &InitialConditions {
        &self.inner.initial
    }

    pub fn options(&self) -> &ModelOptions {
        &self.inner.options
    }

    pub fn integration(&self) -> &IntegrationSettings {
        &self.inner.integration
    }

    /// Raw view, e.g. as the base for overrides
    pub fn parameters(&self) -> &SimulationParameters {
        &self.inner
    }

    pub fn into_parameters(self) -> SimulationParameters {
        self.inner
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::reference()
    }
}

impl TryFrom<SimulationParameters> for ParameterSet {
    type Error = ValidationError;

    fn try_from(params: SimulationParameters) -> Result<Self, Self::Error> {
        ParameterSet::new(params)
    }
}

fn optimum_field(factor: EnvironmentalFactor) -> &'static str {
    match factor {
        EnvironmentalFactor::Temperature => "temperature.optimum",
        EnvironmentalFactor::Ph => "ph.optimum",
        EnvironmentalFactor::DissolvedOxygen => "dissolved_oxygen.optimum",
        EnvironmentalFactor::Glucose => "glucose.optimum",
    }
}

fn width_field(factor: EnvironmentalFactor) -> &'static str {
    match factor {
        EnvironmentalFactor::Temperature => "temperature.tolerance_width",
        EnvironmentalFactor::Ph => "ph.tolerance_width",
        EnvironmentalFactor::DissolvedOxygen => "dissolved_oxygen.tolerance_width",
        EnvironmentalFactor::Glucose => "glucose.tolerance_width",
    }
}
