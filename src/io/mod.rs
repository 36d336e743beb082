pub mod export;
pub mod regions;
