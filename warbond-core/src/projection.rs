//! Compound-growth projection of bond annual rates.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("the number of principals ({principals}) and annual rates ({rates}) must be equal")]
    ShapeMismatch { principals: usize, rates: usize },
}

/// One projected trajectory: `values[y]` is the value after `y` years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthSeries {
    pub label: String,
    pub principal: f64,
    pub annual_rate: f64,
    pub values: Vec<f64>,
}

impl GrowthSeries {
    pub fn new(principal: f64, annual_rate: f64, years: usize) -> Self {
        Self {
            label: legend_label(principal, annual_rate),
            principal,
            annual_rate,
            values: compound(principal, annual_rate, years),
        }
    }

    pub fn final_value(&self) -> f64 {
        self.values.last().copied().unwrap_or(self.principal)
    }
}

/// Value of `principal` compounded once a year at `annual_rate`.
/// Returns `years + 1` points, starting with the principal itself.
pub fn compound(principal: f64, annual_rate: f64, years: usize) -> Vec<f64> {
    let mut value = principal;
    let mut out = Vec::with_capacity(years + 1);
    out.push(value);
    for _ in 0..years {
        value += value * annual_rate;
        out.push(value);
    }
    out
}

/// Project each `(principal, rate)` pair over `years`.
pub fn project_growth(
    principals: &[f64],
    annual_rates: &[f64],
    years: usize,
) -> Result<Vec<GrowthSeries>, ProjectionError> {
    if principals.len() != annual_rates.len() {
        return Err(ProjectionError::ShapeMismatch {
            principals: principals.len(),
            rates: annual_rates.len(),
        });
    }
    Ok(principals
        .iter()
        .zip(annual_rates)
        .map(|(&principal, &rate)| GrowthSeries::new(principal, rate, years))
        .collect())
}

/// Legend text: principal with two decimals, rate as a percentage.
pub fn legend_label(principal: f64, annual_rate: f64) -> String {
    format!("{principal:.2} | {:.2}%", annual_rate * 100.0)
}
