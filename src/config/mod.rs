//! Configuration module for fermentation run parameters.
//!
//! Raw parameters are plain serde structs; validation turns them into an
//! immutable [`ParameterSet`].

mod error;
mod parameters;

pub use error::ValidationError;
pub use parameters::{
    DeathCoupling, EnvironmentParameters, EnvironmentalFactor, EnvironmentalSetpoint,
    GlucoseSource, InitialConditions, IntegrationSettings, KineticParameters, ModelOptions,
    ParameterSet, SimulationParameters, DEFAULT_DURATION_H, DISSOLVED_OXYGEN_RANGE_PERCENT,
    GLUCOSE_RANGE, MAX_DURATION_H, MAX_SUBSTEPS_PER_HOUR, PH_RANGE, TEMPERATURE_RANGE_C,
};
