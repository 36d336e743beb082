//! Loss percentages and monthly loss-reduction projections.

mod comparison;
mod periods;
mod projector;

pub use comparison::LossComparison;
pub use periods::{PeriodLabels, calendar_periods};
pub use projector::{LossPoint, LossProjector, LossSeries, ProjectionMode, project};
