use serde::{Deserialize, Serialize};

use crate::basic::{PfError, PfResult};

/// Losses of a feeder before and after an optimisation, relative to a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossComparison {
    pub baseline: f64, // Historical losses (kWh)
    pub before: f64,   // Losses before optimisation (kWh)
    pub after: f64,    // Losses after optimisation (kWh)
}

impl LossComparison {
    /// `after` is `before / improvement_factor`.
    pub fn new(baseline: f64, before: f64, improvement_factor: f64) -> PfResult<Self> {
        if !(baseline.is_finite() && baseline > 0.0) {
            return Err(PfError::invalid(format!(
                "baseline losses must be positive, got {baseline}"
            )));
        }
        if !(before.is_finite() && before >= 0.0) {
            return Err(PfError::invalid(format!(
                "losses before optimisation must be non-negative, got {before}"
            )));
        }
        if !(improvement_factor.is_finite() && improvement_factor > 0.0) {
            return Err(PfError::invalid(format!(
                "improvement factor must be positive, got {improvement_factor}"
            )));
        }
        Ok(Self {
            baseline,
            before,
            after: before / improvement_factor,
        })
    }

    pub fn before_percentage(&self) -> f64 {
        100.0 * self.before / self.baseline
    }

    pub fn after_percentage(&self) -> f64 {
        100.0 * self.after / self.baseline
    }

    /// Absolute loss reduction achieved by the optimisation.
    pub fn reduction(&self) -> f64 {
        self.before - self.after
    }
}
