//! Hourly time series produced by one simulation run.

use serde::Serialize;

use super::SimulationState;

/// Components truncated at zero during one recorded interval
///
/// Explicit Euler can overshoot near substrate depletion or culture collapse.
/// The integrator clamps and records the truncation here instead of losing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ClampFlags {
    pub viable: bool,
    pub dead: bool,
    pub substrate: bool,
    pub product: bool,
}

impl ClampFlags {
    /// True if any component was clamped
    pub fn any(&self) -> bool {
        self.viable || self.dead || self.substrate || self.product
    }

    /// Union with another set of flags
    pub fn merge(&mut self, other: ClampFlags) {
        self.viable |= other.viable;
        self.dead |= other.dead;
        self.substrate |= other.substrate;
        self.product |= other.product;
    }
}

/// A recorded interval in which at least one component was clamped
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericalAnomaly {
    /// Index of the sample that ends the interval
    pub sample_index: usize,
    /// Time of that sample (h)
    pub time_h: f64,
    /// Which components were truncated
    pub clamped: ClampFlags,
}

/// Ordered hourly snapshots from t = 0 to the end of the horizon
///
/// Always holds at least two samples. `clamps[i]` describes the interval that
/// ends at `samples[i]`; `clamps[0]` is always empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    samples: Vec<SimulationState>,
    clamps: Vec<ClampFlags>,
}

impl TimeSeries {
    pub(crate) fn from_parts(samples: Vec<SimulationState>, clamps: Vec<ClampFlags>) -> Self {
        debug_assert_eq!(samples.len(), clamps.len());
        debug_assert!(samples.len() >= 2);
        Self { samples, clamps }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Never true for a series produced by the integrator
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[SimulationState] {
        &self.samples
    }

    pub fn clamp_flags(&self) -> &[ClampFlags] {
        &self.clamps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SimulationState> {
        self.samples.iter()
    }

    /// Sample at index, if present
    pub fn get(&self, idx: usize) -> Option<&SimulationState> {
        self.samples.get(idx)
    }

    /// State at t = 0
    pub fn initial_state(&self) -> &SimulationState {
        &self.samples[0]
    }

    /// State at the end of the horizon
    pub fn final_state(&self) -> &SimulationState {
        &self.samples[self.samples.len() - 1]
    }

    /// Intervals in which clamping occurred, in time order
    pub fn anomalies(&self) -> Vec<NumericalAnomaly> {
        self.clamps
            .iter()
            .enumerate()
            .filter(|(_, flags)| flags.any())
            .map(|(i, flags)| NumericalAnomaly {
                sample_index: i,
                time_h: self.samples[i].time_h,
                clamped: *flags,
            })
            .collect()
    }

    /// Number of recorded intervals containing a clamp
    pub fn clamped_interval_count(&self) -> usize {
        self.clamps.iter().filter(|flags| flags.any()).count()
    }

    /// True if any component was ever truncated
    pub fn was_clamped(&self) -> bool {
        self.clamps.iter().any(ClampFlags::any)
    }

    pub fn times_h(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time_h).collect()
    }

    pub fn viable_density(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.Xv).collect()
    }

    pub fn dead_density(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.Xd).collect()
    }

    pub fn substrate(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.S).collect()
    }

    pub fn product(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.P).collect()
    }

    /// Viability (fraction) per sample
    pub fn viability(&self) -> Vec<f64> {
        self.samples.iter().map(SimulationState::viability).collect()
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a SimulationState;
    type IntoIter = std::slice::Iter<'a, SimulationState>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(time_h: f64, Xv: f64) -> SimulationState {
        SimulationState {
            time_h,
            Xv,
            Xd: 0.0,
            S: 1.0,
            P: 0.0,
        }
    }

    #[test]
    fn test_anomalies_report_clamped_intervals() {
        let samples = vec![state(0.0, 1.0), state(1.0, 2.0), state(2.0, 0.0)];
        let clamps = vec![
            ClampFlags::default(),
            ClampFlags::default(),
            ClampFlags {
                viable: true,
                ..Default::default()
            },
        ];
        let series = TimeSeries::from_parts(samples, clamps);

        let anomalies = series.anomalies();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].sample_index, 2);
        assert!(anomalies[0].clamped.viable);
        assert!(series.was_clamped());
        assert_eq!(series.clamped_interval_count(), 1);
    }

    #[test]
    fn test_merge_flags() {
        let mut flags = ClampFlags {
            substrate: true,
            ..Default::default()
        };
        flags.merge(ClampFlags {
            viable: true,
            ..Default::default()
        });
        assert!(flags.substrate && flags.viable);
        assert!(!flags.dead && !flags.product);
    }
}
