//! Configuration types for Density Life simulation parameters.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// How agents are scheduled within a single step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    /// Agents act one after another in population order, each seeing the
    /// moves already made earlier in the same step.
    #[default]
    Sequential,
    /// Every agent decides against a frozen copy of the grid taken at the
    /// start of the step; all moves are then applied as one batch.
    ///
    /// This is a different simulation from `Sequential`: agents never see
    /// each other's same-step moves.
    Synchronous,
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid width in cells (X dimension).
    pub width: usize,
    /// Grid height in cells (Y dimension).
    pub height: usize,
    /// Number of agents placed at simulation start.
    pub population: usize,
    /// Generations executed by a full run.
    pub generations: usize,
    /// Steps per generation before each selection phase.
    pub steps_per_generation: usize,
    /// Minimum cell occupancy an agent survives with (inclusive).
    pub min_density: f32,
    /// Maximum cell occupancy an agent survives with (inclusive).
    pub max_density: f32,
    /// Minimum cell occupancy a survivor reproduces at (inclusive).
    pub reproduction_min: f32,
    /// Maximum cell occupancy a survivor reproduces at (inclusive).
    pub reproduction_max: f32,
    /// Per-gene mutation probability applied after every step.
    /// Zero disables step-level mutation entirely.
    pub step_mutation_rate: f32,
    /// Per-gene mutation probability for offspring at generation boundaries.
    pub generation_mutation_rate: f32,
    /// Standard deviation of the Gaussian mutation noise.
    pub mutation_sigma: f32,
    /// Seed for the simulation RNG. `None` draws one from entropy.
    pub random_seed: Option<u64>,
    /// Scheduling of agents within a step.
    pub step_mode: StepMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            population: 20,
            generations: 10,
            steps_per_generation: 10,
            min_density: 0.2,
            max_density: 3.0,
            reproduction_min: 1.0,
            reproduction_max: 2.5,
            step_mutation_rate: 0.0,
            generation_mutation_rate: 0.2,
            mutation_sigma: 0.1,
            random_seed: None,
            step_mode: StepMode::Sequential,
        }
    }
}

impl SimulationConfig {
    /// Get total grid size (width * height), `None` on overflow.
    #[inline]
    pub fn grid_size(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        match self.grid_size() {
            Some(cells) if cells <= MAX_CELLS => {}
            _ => return Err(ConfigError::InvalidDimensions),
        }
        check_range("density", self.min_density, self.max_density)?;
        check_range(
            "reproduction",
            self.reproduction_min,
            self.reproduction_max,
        )?;
        check_rate("step_mutation_rate", self.step_mutation_rate)?;
        check_rate("generation_mutation_rate", self.generation_mutation_rate)?;
        if !self.mutation_sigma.is_finite() || self.mutation_sigma < 0.0 {
            return Err(ConfigError::InvalidSigma(self.mutation_sigma));
        }
        Ok(())
    }
}

/// Upper bound on cell count so the cell table stays within `isize::MAX` bytes.
const MAX_CELLS: usize = isize::MAX as usize / std::mem::size_of::<Vec<u64>>();

fn check_range(name: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(ConfigError::InvalidRange { name, min, max });
    }
    Ok(())
}

fn check_rate(name: &'static str, rate: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidRate { name, rate });
    }
    Ok(())
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid dimensions (width, height) must be non-zero and addressable")]
    InvalidDimensions,
    #[error("Invalid {name} range [{min}, {max}]")]
    InvalidRange {
        name: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{name} must lie in [0, 1], got {rate}")]
    InvalidRate { name: &'static str, rate: f32 },
    #[error("Mutation sigma must be finite and non-negative, got {0}")]
    InvalidSigma(f32),
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
