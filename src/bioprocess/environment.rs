//! Environmental readings supplied to the stress model at every step.
//!
//! The reference engine runs at constant setpoints, but the integrator asks an
//! [`EnvironmentProfile`] for fresh readings each step so that time- or
//! state-dependent operating conditions plug in without touching the solver.

use serde::{Deserialize, Serialize};

use crate::config::{EnvironmentParameters, EnvironmentalFactor, GlucoseSource, ParameterSet};
use crate::state::SimulationState;

/// Instantaneous values of the four environmental factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentReadings {
    pub temperature_C: f64,
    pub ph: f64,
    pub dissolved_oxygen_percent: f64,
    pub glucose: f64,
}

impl EnvironmentReadings {
    /// Operating values taken from the setpoints
    pub fn from_setpoints(environment: &EnvironmentParameters) -> Self {
        Self {
            temperature_C: environment.temperature_C.current_value,
            ph: environment.ph.current_value,
            dissolved_oxygen_percent: environment.dissolved_oxygen_percent.current_value,
            glucose: environment.glucose.current_value,
        }
    }

    pub fn get(&self, factor: EnvironmentalFactor) -> f64 {
        match factor {
            EnvironmentalFactor::Temperature => self.temperature_C,
            EnvironmentalFactor::Ph => self.ph,
            EnvironmentalFactor::DissolvedOxygen => self.dissolved_oxygen_percent,
            EnvironmentalFactor::Glucose => self.glucose,
        }
    }

    pub fn set(&mut self, factor: EnvironmentalFactor, value: f64) {
        match factor {
            EnvironmentalFactor::Temperature => self.temperature_C = value,
            EnvironmentalFactor::Ph => self.ph = value,
            EnvironmentalFactor::DissolvedOxygen => self.dissolved_oxygen_percent = value,
            EnvironmentalFactor::Glucose => self.glucose = value,
        }
    }
}

/// Source of environmental readings during integration.
///
/// Implementations must be deterministic: the same `(time_h, state)` must
/// always give the same readings, otherwise runs stop being reproducible.
pub trait EnvironmentProfile: Send + Sync {
    /// Short name for logs and reports
    fn name(&self) -> &'static str;

    /// Readings in effect at `time_h` for the given culture state
    fn readings(&self, time_h: f64, state: &SimulationState) -> EnvironmentReadings;
}

/// Constant setpoints from the parameter set.
///
/// With [`GlucoseSource::Substrate`] the glucose reading follows the live
/// substrate concentration instead of its setpoint.
#[derive(Debug, Clone)]
pub struct SetpointProfile {
    readings: EnvironmentReadings,
    glucose_source: GlucoseSource,
}

impl SetpointProfile {
    pub fn from_parameters(params: &ParameterSet) -> Self {
        Self {
            readings: EnvironmentReadings::from_setpoints(params.environment()),
            glucose_source: params.options().glucose_source,
        }
    }
}

impl EnvironmentProfile for SetpointProfile {
    fn name(&self) -> &'static str {
        match self.glucose_source {
            GlucoseSource::Setpoint => "setpoint",
            GlucoseSource::Substrate => "setpoint (glucose tracks substrate)",
        }
    }

    fn readings(&self, _time_h: f64, state: &SimulationState) -> EnvironmentReadings {
        let mut readings = self.readings;
        if self.glucose_source == GlucoseSource::Substrate {
            readings.glucose = state.S;
        }
        readings
    }
}

/// Setpoint profile with a single step change of one factor.
///
/// Models operating shifts such as the mid-run temperature drop common in
/// CHO production processes.
#[derive(Debug, Clone)]
pub struct StepShiftProfile {
    base: SetpointProfile,
    factor: EnvironmentalFactor,
    shift_at_h: f64,
    shifted_value: f64,
}

impl StepShiftProfile {
    pub fn new(
        params: &ParameterSet,
        factor: EnvironmentalFactor,
        shift_at_h: f64,
        shifted_value: f64,
    ) -> Self {
        Self {
            base: SetpointProfile::from_parameters(params),
            factor,
            shift_at_h,
            shifted_value,
        }
    }
}

impl EnvironmentProfile for StepShiftProfile {
    fn name(&self) -> &'static str {
        "step shift"
    }

    fn readings(&self, time_h: f64, state: &SimulationState) -> EnvironmentReadings {
        let mut readings = self.base.readings(time_h, state);
        if time_h >= self.shift_at_h {
            readings.set(self.factor, self.shifted_value);
        }
        readings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationParameters;

    fn state_with_substrate(S: f64) -> SimulationState {
        SimulationState {
            time_h: 0.0,
            Xv: 1.0e6,
            Xd: 0.0,
            S,
            P: 0.0,
        }
    }

    #[test]
    fn test_setpoint_profile_is_constant() {
        let params = ParameterSet::reference();
        let profile = SetpointProfile::from_parameters(&params);
        let a = profile.readings(0.0, &state_with_substrate(4.0));
        let b = profile.readings(200.0, &state_with_substrate(0.1));
        assert_eq!(a, b);
        assert!((a.temperature_C - 37.0).abs() < 1e-12);
    }

    #[test]
    fn test_glucose_tracks_substrate() {
        let mut raw = SimulationParameters::default();
        raw.options.glucose_source = GlucoseSource::Substrate;
        let params = ParameterSet::new(raw).unwrap();
        let profile = SetpointProfile::from_parameters(&params);

        let readings = profile.readings(5.0, &state_with_substrate(1.25));
        assert!((readings.glucose - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_step_shift_applies_after_shift_time() {
        let params = ParameterSet::reference();
        let profile = StepShiftProfile::new(&params, EnvironmentalFactor::Temperature, 72.0, 33.0);
        let state = state_with_substrate(4.0);

        assert!((profile.readings(71.0, &state).temperature_C - 37.0).abs() < 1e-12);
        assert!((profile.readings(72.0, &state).temperature_C - 33.0).abs() < 1e-12);
    }
}
