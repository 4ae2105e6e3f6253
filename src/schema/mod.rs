//! Schema module - Configuration and report types for Density Life simulations.

mod config;
mod report;

pub use config::*;
pub use report::*;
