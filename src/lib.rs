//! Gauss-Seidel power flow for small radial distribution feeders, with the
//! loss percentages and monthly loss-reduction projections derived from it.
//!
//! ```no_run
//! use radialpf::prelude::*;
//!
//! let regions = RegionTable::builtin()?;
//! let case = regions.get("ULP Boja")?;
//! let net = case.network()?;
//! let res = net.run_pf_with(&case.solver)?;
//! (&net, &res).print_res_bus();
//!
//! let series = case.losses.projection()?;
//! println!("{}", format_loss_series(&series));
//! # Ok::<(), radialpf::prelude::PfError>(())
//! ```
mod basic;
pub mod io;
pub mod losses;
pub mod prelude {
    use crate::basic;
    pub use crate::io::{export::*, regions::*};
    pub use crate::losses::*;
    pub use basic::*;

    pub use basic::post_processing::*;
    pub use basic::system::*;
}
