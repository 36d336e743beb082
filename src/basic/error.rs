//! Error type shared by the solver, the loss projector and the I/O layer.
//!
//! Structural problems with the inputs are reported as [`PfError::InvalidInput`]
//! before any numerical work starts. Running out of iterations is *not* an
//! error, see [`ConvergenceStatus`](crate::prelude::ConvergenceStatus).

use thiserror::Error;

/// Errors raised by power flow and loss computations.
#[derive(Error, Debug)]
pub enum PfError {
    /// Input data violates a structural precondition (shape, sign, range).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A sweep produced a non-finite voltage.
    #[error("numerical breakdown at bus {bus} during sweep {sweep}")]
    NumericalBreakdown { bus: usize, sweep: usize },

    /// The requested region is not present in the region table.
    #[error("unknown region `{0}`")]
    UnknownRegion(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type PfResult<T> = Result<T, PfError>;

impl PfError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        PfError::InvalidInput(msg.into())
    }
}
