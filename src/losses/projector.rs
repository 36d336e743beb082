use derive_more::derive::{Deref, IntoIterator};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::basic::{PfError, PfResult};

/// One period of a loss projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossPoint {
    pub period: usize,
    pub label: String,
    pub loss: f64,       // Loss value (kWh)
    pub percentage: f64, // Loss relative to the baseline (%)
}

/// An ordered, non-increasing sequence of projected losses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Deref, IntoIterator)]
#[serde(transparent)]
pub struct LossSeries(#[into_iterator(owned, ref)] Vec<LossPoint>);

impl LossSeries {
    pub fn losses(&self) -> Vec<f64> {
        self.0.iter().map(|p| p.loss).collect()
    }

    pub fn percentages(&self) -> Vec<f64> {
        self.0.iter().map(|p| p.percentage).collect()
    }

    /// Whether the last period is at or below `target_percentage`.
    pub fn reached_target(&self, target_percentage: f64) -> bool {
        self.0
            .last()
            .is_some_and(|p| p.percentage <= target_percentage)
    }
}

/// How the per-period reduction is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProjectionMode {
    /// Spread the remaining gap to the target over the remaining periods and
    /// stop as soon as the target is reached.
    #[default]
    StopAtTarget,
    /// Apply the same reduction every period for the whole horizon, ignoring the target.
    FixedReduction { percent_per_period: f64 },
}

/// Projects monthly losses towards a target percentage of a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossProjector {
    pub target_percentage: f64,
    #[serde(default)]
    pub mode: ProjectionMode,
}

impl LossProjector {
    pub fn new(target_percentage: f64) -> Self {
        Self {
            target_percentage,
            mode: ProjectionMode::StopAtTarget,
        }
    }

    pub fn with_mode(mut self, mode: ProjectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Projects `period_count` periods, labelled `Period 0`, `Period 1`, ...
    ///
    /// The first element is always the starting loss, so the series holds at
    /// least one point even for `period_count == 0`.
    pub fn project(
        &self,
        initial_loss_magnitude: f64,
        starting_loss: f64,
        period_count: usize,
    ) -> PfResult<LossSeries> {
        self.project_with(initial_loss_magnitude, starting_loss, period_count, |k| {
            format!("Period {k}")
        })
    }

    /// Projects one period per label; `labels[0]` names the starting period.
    pub fn project_labeled<S: AsRef<str>>(
        &self,
        initial_loss_magnitude: f64,
        starting_loss: f64,
        labels: &[S],
    ) -> PfResult<LossSeries> {
        self.project_with(initial_loss_magnitude, starting_loss, labels.len(), |k| {
            labels
                .get(k)
                .map(|s| s.as_ref().to_owned())
                .unwrap_or_else(|| format!("Period {k}"))
        })
    }

    fn project_with(
        &self,
        base: f64,
        starting_loss: f64,
        period_count: usize,
        label: impl Fn(usize) -> String,
    ) -> PfResult<LossSeries> {
        self.validate(base, starting_loss)?;

        let percentage_of = |loss: f64| 100.0 * loss / base;
        let mut points = vec![LossPoint {
            period: 0,
            label: label(0),
            loss: starting_loss,
            percentage: percentage_of(starting_loss),
        }];
        let mut loss = starting_loss;
        let mut pct = percentage_of(starting_loss);

        for k in 1..period_count {
            let reduction_pct = match self.mode {
                ProjectionMode::StopAtTarget => {
                    if pct <= self.target_percentage {
                        debug!(period = k, pct, "loss target reached, projection stopped");
                        break;
                    }
                    (pct - self.target_percentage) / (period_count - k) as f64
                }
                ProjectionMode::FixedReduction { percent_per_period } => percent_per_period,
            };
            loss *= 1.0 - reduction_pct.min(100.0) / 100.0;
            pct = percentage_of(loss);
            points.push(LossPoint {
                period: k,
                label: label(k),
                loss,
                percentage: pct,
            });
        }
        Ok(LossSeries(points))
    }

    fn validate(&self, base: f64, starting_loss: f64) -> PfResult<()> {
        if !(base.is_finite() && base > 0.0) {
            return Err(PfError::invalid(format!(
                "initial loss magnitude must be positive, got {base}"
            )));
        }
        if !(starting_loss.is_finite() && starting_loss >= 0.0) {
            return Err(PfError::invalid(format!(
                "starting loss must be non-negative, got {starting_loss}"
            )));
        }
        if !(0.0..100.0).contains(&self.target_percentage) {
            return Err(PfError::invalid(format!(
                "target percentage must be in [0, 100), got {}",
                self.target_percentage
            )));
        }
        if let ProjectionMode::FixedReduction { percent_per_period } = self.mode {
            if !(0.0..=100.0).contains(&percent_per_period) {
                return Err(PfError::invalid(format!(
                    "fixed reduction must be in [0, 100], got {percent_per_period}"
                )));
            }
        }
        Ok(())
    }
}

/// Projects losses with the stop-at-target rule.
///
/// The per-period reduction is recomputed from the percentage reached so far.
/// Spreading the *initial* gap to target instead (a rate frozen at period 0)
/// gives a steeper path: for baseline 73 083 664 kWh, start 5 193 168 kWh,
/// target 4 % and 12 periods the last point is ≈ 6.4647 % with the frozen
/// rate against ≈ 6.5163 % here.
///
/// # Arguments
///
/// * `initial_loss_magnitude` - Baseline used to normalise percentages, must be positive.
/// * `starting_loss` - Loss at period 0.
/// * `target_percentage` - Stopping threshold in `[0, 100)`.
/// * `period_count` - Total number of periods, the starting one included.
pub fn project(
    initial_loss_magnitude: f64,
    starting_loss: f64,
    target_percentage: f64,
    period_count: usize,
) -> PfResult<LossSeries> {
    LossProjector::new(target_percentage).project(initial_loss_magnitude, starting_loss, period_count)
}
