//! Serializable views of simulation progress.

use serde::{Deserialize, Serialize};

/// Which phase the next call in a generation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Agents sense and move.
    Step,
    /// Survival filtering and reproduction.
    Selection,
}

/// Outcome of one selection phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Generation counter after the selection phase.
    pub generation: usize,
    /// Agents that passed the survival test.
    pub survivors: usize,
    /// Agents removed for leaving the survival range.
    pub deaths: usize,
    /// Offspring created.
    pub births: usize,
    /// Population entering the next generation.
    pub population_size: usize,
}

/// Snapshot handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateReport {
    /// Occupancy counts, `grid[x][y]`.
    pub grid: Vec<Vec<usize>>,
    /// Grid dimensions as (width, height).
    pub grid_size: (usize, usize),
    pub generation: usize,
    /// Steps executed in the current generation.
    pub step: usize,
    pub population_size: usize,
}

/// Result of a full run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Seed the run was started with.
    pub seed: u64,
    /// Generations completed.
    pub generations: usize,
    /// Population size after each generation.
    pub population_history: Vec<usize>,
    /// Population at the end of the run.
    pub final_population: usize,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
}
