//! Gaussian environmental stress model.
//!
//! Each factor contributes a desirability score
//!
//!   score = exp(-(x - x_opt)² / (2σ²))
//!
//! which is 1 at the optimum and decays symmetrically. The combined stress
//! multiplier is the product of the four scores, so a single strongly
//! off-optimum factor suppresses growth regardless of the others.

use serde::Serialize;

use crate::config::{EnvironmentParameters, EnvironmentalFactor, ParameterSet};

use super::environment::EnvironmentReadings;

/// Lower bound of the multiplier; keeps it inside (0, 1] when the product underflows
pub const MIN_STRESS: f64 = f64::MIN_POSITIVE;

/// Gaussian desirability of a reading
#[inline]
pub fn gaussian_score(current: f64, optimum: f64, tolerance_width: f64) -> f64 {
    let deviation = current - optimum;
    (-(deviation * deviation) / (2.0 * tolerance_width * tolerance_width)).exp()
}

/// Per-factor scores and their combined multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StressBreakdown {
    pub temperature: f64,
    pub ph: f64,
    pub dissolved_oxygen: f64,
    pub glucose: f64,
    /// Product of the four scores, clamped to (0, 1]
    pub combined: f64,
}

impl StressBreakdown {
    pub fn score(&self, factor: EnvironmentalFactor) -> f64 {
        match factor {
            EnvironmentalFactor::Temperature => self.temperature,
            EnvironmentalFactor::Ph => self.ph,
            EnvironmentalFactor::DissolvedOxygen => self.dissolved_oxygen,
            EnvironmentalFactor::Glucose => self.glucose,
        }
    }

    /// Factor with the lowest score, i.e. the one limiting growth most
    pub fn dominant_factor(&self) -> EnvironmentalFactor {
        EnvironmentalFactor::ALL
            .into_iter()
            .fold(EnvironmentalFactor::Temperature, |worst, factor| {
                if self.score(factor) < self.score(worst) {
                    factor
                } else {
                    worst
                }
            })
    }
}

/// Converts readings into the combined stress multiplier
#[derive(Debug, Clone, Copy)]
pub struct StressModel<'a> {
    environment: &'a EnvironmentParameters,
}

impl<'a> StressModel<'a> {
    pub fn new(params: &'a ParameterSet) -> Self {
        Self {
            environment: params.environment(),
        }
    }

    /// Score of a single factor at the given reading
    pub fn score(&self, factor: EnvironmentalFactor, reading: f64) -> f64 {
        let setpoint = self.environment.get(factor);
        gaussian_score(reading, setpoint.optimum, setpoint.tolerance_width)
    }

    /// Full per-factor evaluation
    pub fn evaluate(&self, readings: &EnvironmentReadings) -> StressBreakdown {
        let temperature = self.score(EnvironmentalFactor::Temperature, readings.temperature_C);
        let ph = self.score(EnvironmentalFactor::Ph, readings.ph);
        let dissolved_oxygen = self.score(
            EnvironmentalFactor::DissolvedOxygen,
            readings.dissolved_oxygen_percent,
        );
        let glucose = self.score(EnvironmentalFactor::Glucose, readings.glucose);

        let combined = (temperature * ph * dissolved_oxygen * glucose).clamp(MIN_STRESS, 1.0);

        StressBreakdown {
            temperature,
            ph,
            dissolved_oxygen,
            glucose,
            combined,
        }
    }

    /// Combined multiplier only
    #[inline]
    pub fn multiplier(&self, readings: &EnvironmentReadings) -> f64 {
        self.evaluate(readings).combined
    }
}
