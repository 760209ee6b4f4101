//! Culture state vector stepped by the integrator.

use serde::{Deserialize, Serialize};

use crate::config::ParameterSet;

/// Snapshot of the bioreactor at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Elapsed culture time (h)
    pub time_h: f64,
    /// Viable cell density (cells/mL)
    pub Xv: f64,
    /// Dead cell density (cells/mL)
    pub Xd: f64,
    /// Limiting substrate concentration
    pub S: f64,
    /// Product (antibody) titer
    pub P: f64,
}

impl SimulationState {
    /// State at inoculation
    pub fn initial(params: &ParameterSet) -> Self {
        let init = params.initial();
        Self {
            time_h: 0.0,
            Xv: init.Xv0,
            Xd: init.Xd0,
            S: init.S0,
            P: init.P0,
        }
    }

    /// Total cell density, viable plus dead
    #[inline]
    pub fn total_density(&self) -> f64 {
        self.Xv + self.Xd
    }

    /// Viable fraction of all cells, 0 when no cells are present
    pub fn viability(&self) -> f64 {
        let total = self.total_density();
        if total > 0.0 {
            self.Xv / total
        } else {
            0.0
        }
    }

    /// Dead fraction of all cells, 0 when no cells are present
    pub fn dead_fraction(&self) -> f64 {
        let total = self.total_density();
        if total > 0.0 {
            self.Xd / total
        } else {
            0.0
        }
    }

    /// True when every component is non-negative
    pub fn is_non_negative(&self) -> bool {
        self.Xv >= 0.0 && self.Xd >= 0.0 && self.S >= 0.0 && self.P >= 0.0
    }
}
