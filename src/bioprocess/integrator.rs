//! Fixed-step explicit Euler integration of the culture ODEs.
//!
//! y(t + dt) = y(t) + dt * f(t, y(t))
//!
//! Euler can overshoot below zero as substrate depletes or the culture
//! collapses. Each component is truncated at zero and the truncation is
//! recorded in the [`TimeSeries`] clamp flags. The run always covers the full
//! horizon, a dead culture included.
//!
//! The default step is one hour, matching the hourly sample grid. Setting
//! `substeps_per_hour > 1` integrates with a smaller step while still
//! recording one sample per hour.

use crate::config::ParameterSet;
use crate::state::{ClampFlags, SimulationState, TimeSeries};

use super::environment::{EnvironmentProfile, SetpointProfile};
use super::kinetics::{KineticModel, Rates};
use super::stress::StressModel;

/// Euler integrator bound to one parameter set and environment profile
pub struct EulerIntegrator<'a> {
    params: &'a ParameterSet,
    kinetics: KineticModel<'a>,
    stress: StressModel<'a>,
    profile: &'a dyn EnvironmentProfile,
}

impl<'a> EulerIntegrator<'a> {
    /// Integrator reading environmental values from `profile`
    pub fn new(params: &'a ParameterSet, profile: &'a dyn EnvironmentProfile) -> Self {
        Self {
            params,
            kinetics: KineticModel::new(params),
            stress: StressModel::new(params),
            profile,
        }
    }

    /// Rates at the given state, with stress evaluated from the profile
    pub fn rates_at(&self, state: &SimulationState) -> Rates {
        let readings = self.profile.readings(state.time_h, state);
        let stress = self.stress.multiplier(&readings);
        self.kinetics.rates(state, stress)
    }

    /// Advance `state` by `dt_h` in place, returning the clamped components.
    ///
    /// `time_h` is not advanced here; the caller owns the time grid. Cells
    /// dying within one step never exceed the viable cells available in it,
    /// so `Xv + Xd` only grows through growth.
    pub fn step(&self, state: &mut SimulationState, dt_h: f64) -> ClampFlags {
        let rates = self.rates_at(state);

        let available = (state.Xv + dt_h * rates.mu_per_h * state.Xv).max(0.0);
        let died = (dt_h * rates.dXd_dt).min(available);

        let mut flags = ClampFlags::default();
        state.Xv = clamp_non_negative(state.Xv + dt_h * rates.dXv_dt, &mut flags.viable);
        state.Xd = clamp_non_negative(state.Xd + died, &mut flags.dead);
        state.S = clamp_non_negative(state.S + dt_h * rates.dS_dt, &mut flags.substrate);
        state.P = clamp_non_negative(state.P + dt_h * rates.dP_dt, &mut flags.product);
        flags
    }

    /// Integrate over the full horizon, one sample per hour
    pub fn run(&self) -> TimeSeries {
        let settings = self.params.integration();
        let substeps = settings.substeps_per_hour;
        let dt_h = settings.dt_h();
        let n_samples = settings.sample_count();

        let mut samples = Vec::with_capacity(n_samples);
        let mut clamps = Vec::with_capacity(n_samples);

        let mut state = SimulationState::initial(self.params);
        samples.push(state);
        clamps.push(ClampFlags::default());

        for hour in 0..settings.duration_h {
            let mut interval_flags = ClampFlags::default();
            for sub in 0..substeps {
                let flags = self.step(&mut state, dt_h);
                // Exact on the hourly grid regardless of dt rounding
                state.time_h = f64::from(hour) + f64::from(sub + 1) / f64::from(substeps);
                if flags.any() {
                    log::debug!(
                        "Clamped negative component at t = {:.3} h: {:?}",
                        state.time_h,
                        flags
                    );
                }
                interval_flags.merge(flags);
            }
            state.time_h = f64::from(hour + 1);
            samples.push(state);
            clamps.push(interval_flags);
        }

        TimeSeries::from_parts(samples, clamps)
    }
}

#[inline]
fn clamp_non_negative(value: f64, clamped: &mut bool) -> f64 {
    if value < 0.0 {
        *clamped = true;
        0.0
    } else {
        value
    }
}

/// Run one batch at the parameter set's own setpoints
pub fn simulate(params: &ParameterSet) -> TimeSeries {
    let profile = SetpointProfile::from_parameters(params);
    simulate_with_profile(params, &profile)
}

/// Run one batch with a caller-supplied environment profile
pub fn simulate_with_profile(params: &ParameterSet, profile: &dyn EnvironmentProfile) -> TimeSeries {
    log::debug!(
        "Simulating {} h with {} environment",
        params.integration().duration_h,
        profile.name()
    );
    EulerIntegrator::new(params, profile).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeathCoupling, SimulationParameters};

    #[test]
    fn test_reference_run_has_hourly_samples() {
        let series = simulate(&ParameterSet::reference());
        assert_eq!(series.len(), 289);
        for (i, sample) in series.iter().enumerate() {
            assert_eq!(sample.time_h, i as f64);
        }
    }

    #[test]
    fn test_single_step_matches_hand_calculation() {
        let params = ParameterSet::reference();
        let profile = SetpointProfile::from_parameters(&params);
        let integrator = EulerIntegrator::new(&params, &profile);

        let mut state = SimulationState::initial(&params);
        let flags = integrator.step(&mut state, 1.0);
        assert!(!flags.any());

        let mu = 0.035 * 4.0 / 4.5;
        let expected_xv = 5.0e5 + (mu - 0.002) * 5.0e5;
        assert!((state.Xv - expected_xv).abs() < 1e-6);
        assert!((state.Xd - 0.002 * 5.0e5).abs() < 1e-9);
        assert!((state.S - (4.0 - mu * 5.0e5 / 2.0e8)).abs() < 1e-12);
        assert!((state.P - 1.0e-10 * 5.0e5).abs() < 1e-15);
    }

    #[test]
    fn test_overshoot_is_clamped_and_flagged() {
        let params = ParameterSet::reference();
        let profile = SetpointProfile::from_parameters(&params);
        let integrator = EulerIntegrator::new(&params, &profile);

        // Dense culture on a trace of substrate: one Euler hour overshoots
        let mut state = SimulationState {
            time_h: 100.0,
            Xv: 5.0e9,
            Xd: 0.0,
            S: 0.01,
            P: 1.0,
        };
        let flags = integrator.step(&mut state, 1.0);
        assert!(flags.substrate);
        assert_eq!(state.S, 0.0);
        assert!(state.is_non_negative());
    }

    #[test]
    fn test_death_flux_limited_to_available_cells() {
        let mut raw = SimulationParameters::default();
        raw.options.death_coupling = DeathCoupling::Reciprocal;
        raw.environment.ph.current_value = 14.0;
        let params = ParameterSet::new(raw).unwrap();
        let profile = SetpointProfile::from_parameters(&params);
        let integrator = EulerIntegrator::new(&params, &profile);

        let mut state = SimulationState::initial(&params);
        let flags = integrator.step(&mut state, 1.0);
        assert!(flags.viable);
        assert_eq!(state.Xv, 0.0);
        assert!(state.Xd.is_finite());
        assert!(
            (state.Xd - 5.0e5).abs() < 1e-3,
            "every seed cell dies once, got Xd = {}",
            state.Xd
        );
    }

    #[test]
    fn test_substeps_keep_hourly_grid() {
        let mut raw = SimulationParameters::default();
        raw.integration.substeps_per_hour = 4;
        raw.integration.duration_h = 48;
        let series = simulate(&ParameterSet::new(raw).unwrap());
        assert_eq!(series.len(), 49);
        assert_eq!(series.final_state().time_h, 48.0);
    }
}
