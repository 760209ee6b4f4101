//! Pearson correlation across an ensemble of runs.

use serde::Serialize;

/// Pearson correlation coefficient over pairwise-complete observations.
///
/// Pairs where either value is non-finite are skipped, so a missing parameter
/// (e.g. no inhibition constant) only drops its own runs. Returns `None` when
/// fewer than two pairs remain or either column is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .collect();

    if pairs.len() < 2 {
        return None;
    }
    let (x0, y0) = pairs[0];
    if pairs.iter().all(|&(a, _)| a == x0) || pairs.iter().all(|&(_, b)| b == y0) {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for &(a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Labelled correlation matrix; `None` marks an undefined coefficient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlate every row column against every column column
    pub fn between(rows: &[(String, Vec<f64>)], columns: &[(String, Vec<f64>)]) -> Self {
        let values = rows
            .iter()
            .map(|(_, row)| columns.iter().map(|(_, col)| pearson(row, col)).collect())
            .collect();

        Self {
            rows: rows.iter().map(|(name, _)| name.clone()).collect(),
            columns: columns.iter().map(|(name, _)| name.clone()).collect(),
            values,
        }
    }

    /// Square matrix of a set of columns against themselves
    pub fn symmetric(columns: &[(String, Vec<f64>)]) -> Self {
        Self::between(columns, columns)
    }

    /// Coefficient by row and column label
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|name| name == row)?;
        let c = self.columns.iter().position(|name| name == column)?;
        self.values[r][c]
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}
