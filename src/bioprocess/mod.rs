//! Bioprocess model for batch CHO cell culture.
//!
//! This module implements the culture dynamics of a single-substrate batch:
//! - Environmental stress (temperature, pH, dissolved oxygen, glucose)
//! - Monod/Haldane growth with stress-coupled death
//! - Growth-linked substrate consumption and constant-rate product formation
//! - Explicit Euler integration over a fixed hourly horizon
//!
//! The whole pipeline is a pure function of the [`ParameterSet`](crate::config::ParameterSet):
//! identical parameters give bit-for-bit identical time series.

pub mod environment;
pub mod integrator;
pub mod kinetics;
pub mod stress;

pub use environment::{EnvironmentProfile, EnvironmentReadings, SetpointProfile, StepShiftProfile};
pub use integrator::{simulate, simulate_with_profile, EulerIntegrator};
pub use kinetics::{
    haldane, haldane_optimum, monod, KineticModel, Rates, RECIPROCAL_STRESS_FLOOR,
};
pub use stress::{gaussian_score, StressBreakdown, StressModel, MIN_STRESS};
