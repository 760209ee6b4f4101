//! State management for the fermentation simulation.
//!
//! Contains the culture state vector and the time series a run produces.

mod culture;
mod series;

pub use culture::SimulationState;
pub use series::{ClampFlags, NumericalAnomaly, TimeSeries};
