//! Density Life - Evolving animals on a crowded grid.
//!
//! Animals live on a bounded 2D grid, sense how crowded the cells around
//! them are, and pick a move through a tiny feed-forward network whose
//! weights are their genome. After a fixed number of steps, animals in
//! cells that are too empty or too full die, and those in comfortably
//! shared cells reproduce with a mutated genome.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration and serializable report types
//! - `compute`: Genome, sensing, policy, grid and the generation loop
//!
//! # Example
//!
//! ```rust,no_run
//! use density_life::{SimulationConfig, SimulationState};
//!
//! let config = SimulationConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut state = SimulationState::initialize(config).unwrap();
//! let summary = state
//!     .run_with_callback(|report| {
//!         println!("Generation {}: {} animals", report.generation, report.population_size);
//!     })
//!     .unwrap();
//!
//! println!("Final population: {}", summary.final_population);
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{SimulationError, SimulationState, SimulationStats};
pub use schema::{SimulationConfig, StateReport, StepMode};
