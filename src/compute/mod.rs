//! Compute module - Agent model and generation loop for Density Life.

mod agent;
mod genome;
mod grid;
mod policy;
mod sensor;
mod simulation;

pub use agent::*;
pub use genome::*;
pub use grid::*;
pub use policy::*;
pub use sensor::*;
pub use simulation::*;
