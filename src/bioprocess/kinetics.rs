//! Unstructured growth kinetics for a single limiting substrate.
//!
//! - Growth: Monod, or Haldane when a substrate-inhibition constant is set
//! - Death: baseline rate raised by environmental stress
//! - Substrate: consumed by growth only, through the yield coefficient
//! - Product: formed at a constant specific rate per viable cell
//!
//! References:
//! - Monod J. Annu Rev Microbiol. 1949;3:371-394
//! - Andrews JF. Biotechnol Bioeng. 1968;10:707-723 (Haldane form)

use serde::Serialize;

use crate::config::{DeathCoupling, KineticParameters, ModelOptions, ParameterSet};
use crate::state::SimulationState;

/// Lowest stress the reciprocal death coupling divides by; caps kd at
/// `kd_base * 1e12` when the combined multiplier underflows
pub const RECIPROCAL_STRESS_FLOOR: f64 = 1e-12;

/// Monod saturation term S / (Ks + S)
///
/// Zero for non-positive substrate and for a degenerate denominator.
#[inline]
pub fn monod(s: f64, ks: f64) -> f64 {
    if s <= 0.0 {
        return 0.0;
    }
    saturating_ratio(s, ks + s)
}

/// Haldane saturation term S / (Ks + S + S²/Ki)
///
/// Peaks at S = sqrt(Ks * Ki) and decreases beyond it.
#[inline]
pub fn haldane(s: f64, ks: f64, ki: f64) -> f64 {
    if s <= 0.0 {
        return 0.0;
    }
    saturating_ratio(s, ks + s + s * s / ki)
}

/// Substrate concentration at which the Haldane term is maximal
#[inline]
pub fn haldane_optimum(ks: f64, ki: f64) -> f64 {
    (ks * ki).sqrt()
}

#[inline]
fn saturating_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    numerator / denominator
}

/// Instantaneous specific and volumetric rates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rates {
    /// Specific growth rate (1/h)
    pub mu_per_h: f64,
    /// Specific death rate (1/h)
    pub kd_per_h: f64,
    /// dXv/dt (cells/mL/h)
    pub dXv_dt: f64,
    /// dXd/dt (cells/mL/h)
    pub dXd_dt: f64,
    /// dS/dt (substrate units/h)
    pub dS_dt: f64,
    /// dP/dt (product units/h)
    pub dP_dt: f64,
}

/// Rate equations bound to one parameter set
#[derive(Debug, Clone, Copy)]
pub struct KineticModel<'a> {
    kinetics: &'a KineticParameters,
    options: &'a ModelOptions,
}

impl<'a> KineticModel<'a> {
    pub fn new(params: &'a ParameterSet) -> Self {
        Self {
            kinetics: params.kinetics(),
            options: params.options(),
        }
    }

    /// Substrate limitation term, Monod or Haldane
    pub fn substrate_factor(&self, S: f64) -> f64 {
        match self.kinetics.Ki {
            Some(ki) => haldane(S, self.kinetics.Ks, ki),
            None => monod(S, self.kinetics.Ks),
        }
    }

    /// mu = mu_max * stress * f(S)
    pub fn specific_growth_rate(&self, S: f64, stress: f64) -> f64 {
        self.kinetics.mu_max_per_h * stress * self.substrate_factor(S)
    }

    /// Death rate under the configured stress coupling
    pub fn specific_death_rate(&self, stress: f64) -> f64 {
        let kd_base = self.kinetics.kd_base_per_h;
        match self.options.death_coupling {
            DeathCoupling::Linear => kd_base * (1.0 + (1.0 - stress)),
            DeathCoupling::Reciprocal => kd_base / stress.max(RECIPROCAL_STRESS_FLOOR),
        }
    }

    /// Product formed per viable cell per hour
    pub fn specific_productivity(&self, stress: f64) -> f64 {
        if self.options.product_stress_coupled {
            self.kinetics.qp * stress
        } else {
            self.kinetics.qp
        }
    }

    /// All four derivatives at the given state and stress
    pub fn rates(&self, state: &SimulationState, stress: f64) -> Rates {
        let mu = self.specific_growth_rate(state.S, stress);
        let kd = self.specific_death_rate(stress);
        let Xv = state.Xv;

        Rates {
            mu_per_h: mu,
            kd_per_h: kd,
            dXv_dt: (mu - kd) * Xv,
            dXd_dt: kd * Xv,
            dS_dt: -(mu * Xv) / self.kinetics.Yxs,
            dP_dt: self.specific_productivity(stress) * Xv,
        }
    }
}
