#[allow(clippy::module_inception)]
mod system;
pub use system::*;
