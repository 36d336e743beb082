pub(crate) mod error;
pub(crate) mod gausspf;

pub mod post_processing;
pub mod system;
pub use error::{PfError, PfResult};
pub use gausspf::{
    ConvergenceStatus, DEFAULT_MAX_ITER, DEFAULT_TOLERANCE, PowerFlowResult, gauss_seidel_pf,
};
