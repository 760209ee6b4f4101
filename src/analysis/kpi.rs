//! Key performance indicators of a completed batch.
//!
//! Every KPI is a pure reduction over one [`TimeSeries`]; nothing is
//! re-simulated and repeated calls give identical results.

use serde::{Deserialize, Serialize};

use crate::state::TimeSeries;

/// Named KPI identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kpi {
    PeakViableDensity,
    TimeOfPeak,
    FinalViability,
    FinalTiter,
    IntegralViableCellDensity,
    ProductYield,
    FinalDeadFraction,
    MeanViability,
    MinViability,
}

impl Kpi {
    /// All KPIs in report order
    pub const ALL: [Kpi; 9] = [
        Kpi::PeakViableDensity,
        Kpi::TimeOfPeak,
        Kpi::FinalViability,
        Kpi::FinalTiter,
        Kpi::IntegralViableCellDensity,
        Kpi::ProductYield,
        Kpi::FinalDeadFraction,
        Kpi::MeanViability,
        Kpi::MinViability,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Kpi::PeakViableDensity => "peak_viable_density",
            Kpi::TimeOfPeak => "time_of_peak_h",
            Kpi::FinalViability => "final_viability",
            Kpi::FinalTiter => "final_titer",
            Kpi::IntegralViableCellDensity => "ivcd",
            Kpi::ProductYield => "product_yield",
            Kpi::FinalDeadFraction => "final_dead_fraction",
            Kpi::MeanViability => "mean_viability",
            Kpi::MinViability => "min_viability",
        }
    }

    /// Human-readable label with units
    pub fn label(self) -> &'static str {
        match self {
            Kpi::PeakViableDensity => "Peak viable cell density (cells/mL)",
            Kpi::TimeOfPeak => "Time of peak (h)",
            Kpi::FinalViability => "Final viability",
            Kpi::FinalTiter => "Final product titer",
            Kpi::IntegralViableCellDensity => "Integral viable cell density (cells·h/mL)",
            Kpi::ProductYield => "Product yield on substrate",
            Kpi::FinalDeadFraction => "Final dead-cell fraction",
            Kpi::MeanViability => "Mean viability",
            Kpi::MinViability => "Minimum viability",
        }
    }
}

/// Scalar KPIs of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    /// Maximum Xv over the run (cells/mL)
    pub peak_viable_density: f64,
    /// Time of the first sample reaching the peak (h)
    pub time_of_peak_h: f64,
    /// Xv / (Xv + Xd) at the final sample
    pub final_viability: f64,
    /// P at the final sample
    pub final_titer: f64,
    /// Trapezoidal area under Xv(t) (cells·h/mL)
    pub ivcd: f64,
    /// Final P per unit substrate consumed; 0 when nothing was consumed
    pub product_yield: f64,
    /// Xd / (Xv + Xd) at the final sample
    pub final_dead_fraction: f64,
    /// Viability averaged over all samples
    pub mean_viability: f64,
    /// Lowest viability over all samples
    pub min_viability: f64,
    /// Intervals in which a component was clamped at zero
    pub clamped_intervals: usize,
}

impl KpiSet {
    /// Reduce a completed series
    pub fn from_series(series: &TimeSeries) -> Self {
        let samples = series.samples();
        let initial = series.initial_state();
        let last = series.final_state();

        let (peak_idx, peak_viable_density) = samples
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(best_idx, best), (i, s)| {
                if s.Xv > best {
                    (i, s.Xv)
                } else {
                    (best_idx, best)
                }
            });

        let ivcd = samples
            .windows(2)
            .map(|w| 0.5 * (w[0].Xv + w[1].Xv) * (w[1].time_h - w[0].time_h))
            .sum();

        let consumed = initial.S - last.S;
        let product_yield = if consumed > 0.0 {
            last.P / consumed
        } else {
            0.0
        };

        let viabilities = series.viability();
        let mean_viability = viabilities.iter().sum::<f64>() / viabilities.len() as f64;
        let min_viability = viabilities.iter().copied().fold(f64::INFINITY, f64::min);

        Self {
            peak_viable_density,
            time_of_peak_h: samples[peak_idx].time_h,
            final_viability: last.viability(),
            final_titer: last.P,
            ivcd,
            product_yield,
            final_dead_fraction: last.dead_fraction(),
            mean_viability,
            min_viability,
            clamped_intervals: series.clamped_interval_count(),
        }
    }

    /// Value of one KPI
    pub fn get(&self, kpi: Kpi) -> f64 {
        match kpi {
            Kpi::PeakViableDensity => self.peak_viable_density,
            Kpi::TimeOfPeak => self.time_of_peak_h,
            Kpi::FinalViability => self.final_viability,
            Kpi::FinalTiter => self.final_titer,
            Kpi::IntegralViableCellDensity => self.ivcd,
            Kpi::ProductYield => self.product_yield,
            Kpi::FinalDeadFraction => self.final_dead_fraction,
            Kpi::MeanViability => self.mean_viability,
            Kpi::MinViability => self.min_viability,
        }
    }

    /// `(name, value)` pairs in report order
    pub fn named(&self) -> Vec<(&'static str, f64)> {
        Kpi::ALL.iter().map(|&kpi| (kpi.name(), self.get(kpi))).collect()
    }
}

/// Reduce a completed series to its KPIs
pub fn calculate_kpis(series: &TimeSeries) -> KpiSet {
    KpiSet::from_series(series)
}
