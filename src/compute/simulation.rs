//! Simulation driver - steps, selection and the generation loop.
//!
//! A generation is `steps_per_generation` calls to [`SimulationState::step`]
//! followed by one [`SimulationState::advance_generation`].

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use log::{debug, info, trace, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{
    ConfigError, GenerationReport, Phase, RunSummary, SimulationConfig, StateReport, StepMode,
};

use super::agent::Agent;
use super::genome::{Genome, GenomeRng, ShapeError, genome_distance};
use super::grid::{AgentId, Grid, GridError, Position};
use super::policy::Action;

/// Errors surfaced by the simulation driver.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Config validation failed: {0}")]
    Config(#[from] ConfigError),
    #[error("Malformed genome: {0}")]
    Shape(#[from] ShapeError),
    #[error("Grid consistency violated: {0}")]
    Grid(#[from] GridError),
}

/// Simulation state container.
///
/// Owns the grid, the population table and the single RNG every random
/// draw goes through. Agents are kept in a fixed order which is also the
/// order they act in.
pub struct SimulationState {
    config: SimulationConfig,
    grid: Grid,
    population: Vec<Agent>,
    rng: GenomeRng,
    seed: u64,
    generation: usize,
    step: usize,
    total_steps: u64,
    next_id: u64,
}

impl SimulationState {
    /// Build the grid and a random initial population.
    pub fn initialize(config: SimulationConfig) -> Result<Self, SimulationError> {
        let mut state = Self::empty(config)?;

        for _ in 0..state.config.population {
            let (x, y) = state
                .rng
                .random_position(state.config.width, state.config.height);
            let genome = state.rng.random_genome();
            state.spawn(Position::new(x, y), genome)?;
        }

        info!(
            "Initialized {}x{} grid with {} agents (seed {})",
            state.config.width,
            state.config.height,
            state.population.len(),
            state.seed
        );
        Ok(state)
    }

    /// Build a simulation with hand-placed agents.
    ///
    /// `config.population` is ignored; agents are added in the given order.
    pub fn from_genomes<I>(config: SimulationConfig, agents: I) -> Result<Self, SimulationError>
    where
        I: IntoIterator<Item = (Position, Genome)>,
    {
        let mut state = Self::empty(config)?;
        for (position, genome) in agents {
            state.spawn(position, genome)?;
        }
        Ok(state)
    }

    fn empty(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let grid = Grid::new(config.width, config.height);

        Ok(Self {
            population: Vec::with_capacity(config.population),
            config,
            grid,
            rng: GenomeRng::new(seed),
            seed,
            generation: 0,
            step: 0,
            total_steps: 0,
            next_id: 0,
        })
    }

    fn alloc_id(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        id
    }

    fn spawn(&mut self, position: Position, genome: Genome) -> Result<AgentId, SimulationError> {
        let id = self.alloc_id();
        let agent = Agent::new(id, position, genome)?;
        self.grid.insert(id, position)?;
        self.population.push(agent);
        Ok(id)
    }

    /// Execute one step phase.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        match self.config.step_mode {
            StepMode::Sequential => self.step_sequential()?,
            StepMode::Synchronous => self.step_synchronous()?,
        }

        if self.config.step_mutation_rate > 0.0 {
            self.mutate_in_step()?;
        }

        self.step += 1;
        self.total_steps += 1;
        debug!(
            "Generation {} step {}: {} agents",
            self.generation,
            self.step,
            self.population.len()
        );
        Ok(())
    }

    /// Each agent senses the grid as left by the agents before it.
    fn step_sequential(&mut self) -> Result<(), GridError> {
        for agent in &mut self.population {
            let action = agent.think_and_act(&mut self.grid)?;
            trace!("{} {:?} -> {:?}", agent.id(), action, agent.position());
        }
        Ok(())
    }

    /// All agents decide against the grid as it was at the start of the
    /// step, then every move is applied in population order.
    fn step_synchronous(&mut self) -> Result<(), GridError> {
        let frozen = &self.grid;
        let actions: Vec<Action> = self
            .population
            .par_iter()
            .map(|agent| agent.decide(frozen))
            .collect();

        for (agent, action) in self.population.iter_mut().zip(actions) {
            agent.apply(action, &mut self.grid)?;
            trace!("{} {:?} -> {:?}", agent.id(), action, agent.position());
        }
        Ok(())
    }

    /// Replace every agent with one carrying a mutated genome, keeping its
    /// id and position.
    fn mutate_in_step(&mut self) -> Result<(), ShapeError> {
        let rate = self.config.step_mutation_rate;
        let sigma = self.config.mutation_sigma;
        for agent in &mut self.population {
            let genome = self.rng.mutate(agent.genome(), rate, sigma);
            *agent = Agent::new(agent.id(), agent.position(), genome)?;
        }
        Ok(())
    }

    /// Execute one selection phase and start the next generation.
    ///
    /// Occupancy is read once for all agents before anyone is removed or
    /// born. Survivors keep their order, each followed by its offspring.
    /// The phase works on staged copies of the grid and RNG; on error the
    /// state is left exactly as it was.
    pub fn advance_generation(&mut self) -> Result<GenerationReport, SimulationError> {
        let counts = self.grid.occupancy_counts();
        let width = self.grid.width();
        let min_density = self.config.min_density;
        let max_density = self.config.max_density;
        let reproduction_min = self.config.reproduction_min;
        let reproduction_max = self.config.reproduction_max;
        let rate = self.config.generation_mutation_rate;
        let sigma = self.config.mutation_sigma;

        let mut grid = self.grid.clone();
        let mut rng = self.rng.clone();
        let mut next_id = self.next_id;
        let mut next = Vec::with_capacity(self.population.len() * 2);
        let mut deaths = 0;
        let mut births = 0;

        for agent in &self.population {
            let pos = agent.position();
            if !grid.contains(pos) {
                return Err(GridError::BoundsViolation { x: pos.x, y: pos.y }.into());
            }
            let occupancy = counts[pos.y * width + pos.x] as f32;

            if !(min_density..=max_density).contains(&occupancy) {
                grid.remove(agent.id(), pos)?;
                deaths += 1;
                continue;
            }

            let child = if (reproduction_min..=reproduction_max).contains(&occupancy) {
                let id = AgentId(next_id);
                next_id += 1;
                Some(agent.offspring(id, &mut rng, rate, sigma)?)
            } else {
                None
            };

            next.push(agent.clone());
            if let Some(child) = child {
                grid.insert(child.id(), child.position())?;
                next.push(child);
                births += 1;
            }
        }

        self.grid = grid;
        self.rng = rng;
        self.next_id = next_id;
        self.population = next;
        self.generation += 1;
        self.step = 0;

        if cfg!(debug_assertions) {
            self.check_consistency()?;
        }

        let report = GenerationReport {
            generation: self.generation,
            survivors: self.population.len() - births,
            deaths,
            births,
            population_size: self.population.len(),
        };

        info!(
            "Generation {}: population {} ({} survived, {} died, {} born)",
            report.generation, report.population_size, report.survivors, deaths, births
        );
        if report.population_size == 0 && deaths > 0 {
            warn!("Population went extinct in generation {}", report.generation);
        }

        Ok(report)
    }

    /// Run the configured steps followed by one selection phase.
    pub fn run_generation(&mut self) -> Result<GenerationReport, SimulationError> {
        for _ in 0..self.config.steps_per_generation {
            self.step()?;
        }
        self.advance_generation()
    }

    /// Run all configured generations with a callback after each.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> Result<RunSummary, SimulationError>
    where
        F: FnMut(&GenerationReport),
    {
        let start = Instant::now();
        let mut population_history = Vec::with_capacity(self.config.generations);

        for _ in 0..self.config.generations {
            let report = self.run_generation()?;
            population_history.push(report.population_size);
            callback(&report);
        }

        Ok(RunSummary {
            seed: self.seed,
            generations: population_history.len(),
            population_history,
            final_population: self.population.len(),
            elapsed_seconds: start.elapsed().as_secs_f64(),
        })
    }

    /// Run all configured generations.
    pub fn run(&mut self) -> Result<RunSummary, SimulationError> {
        self.run_with_callback(|_| {})
    }

    /// Occupancy counts shaped `width x height`.
    pub fn grid_snapshot(&self) -> Vec<Vec<usize>> {
        self.grid.snapshot()
    }

    /// Serializable view for presentation layers.
    pub fn report(&self) -> StateReport {
        StateReport {
            grid: self.grid_snapshot(),
            grid_size: (self.grid.width(), self.grid.height()),
            generation: self.generation,
            step: self.step,
            population_size: self.population.len(),
        }
    }

    /// Phase the next scheduled call belongs to.
    pub fn phase(&self) -> Phase {
        if self.step < self.config.steps_per_generation {
            Phase::Step
        } else {
            Phase::Selection
        }
    }

    /// Check that every agent sits exactly once in the cell matching its
    /// position and that no cell holds unknown ids.
    pub fn check_consistency(&self) -> Result<(), GridError> {
        let mut placed: HashMap<AgentId, Position> =
            HashMap::with_capacity(self.population.len());
        for (pos, occupants) in self.grid.cells() {
            for &id in occupants {
                if placed.insert(id, pos).is_some() {
                    return Err(GridError::DuplicateAgent { id, x: pos.x, y: pos.y });
                }
            }
        }

        let mut known = HashSet::with_capacity(self.population.len());
        for agent in &self.population {
            let pos = agent.position();
            if !self.grid.contains(pos) {
                return Err(GridError::BoundsViolation { x: pos.x, y: pos.y });
            }
            if placed.get(&agent.id()) != Some(&pos) {
                return Err(GridError::MissingAgent {
                    id: agent.id(),
                    x: pos.x,
                    y: pos.y,
                });
            }
            known.insert(agent.id());
        }

        for (pos, occupants) in self.grid.cells() {
            if let Some(&id) = occupants.iter().find(|id| !known.contains(*id)) {
                return Err(GridError::StrayAgent { id, x: pos.x, y: pos.y });
            }
        }

        Ok(())
    }

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Live agents in acting order.
    #[inline]
    pub fn population(&self) -> &[Agent] {
        &self.population
    }

    #[inline]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Steps executed in the current generation.
    #[inline]
    pub fn step_count(&self) -> usize {
        self.step
    }

    #[inline]
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Simulation statistics for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationStats {
    pub population: usize,
    pub occupied_cells: usize,
    pub max_occupancy: usize,
    /// Mean occupancy over occupied cells.
    pub mean_occupancy: f32,
    /// Mean pairwise genome distance.
    pub diversity: f32,
}

impl SimulationStats {
    /// Compute statistics from state.
    pub fn from_state(state: &SimulationState) -> Self {
        let counts = state.grid().occupancy_counts();
        let occupied_cells = counts.iter().filter(|&&c| c > 0).count();
        let max_occupancy = counts.iter().copied().max().unwrap_or(0);
        let population = state.population().len();

        let mean_occupancy = if occupied_cells > 0 {
            population as f32 / occupied_cells as f32
        } else {
            0.0
        };

        Self {
            population,
            occupied_cells,
            max_occupancy,
            mean_occupancy,
            diversity: compute_diversity(state.population()),
        }
    }
}

fn compute_diversity(population: &[Agent]) -> f32 {
    if population.len() < 2 {
        return 0.0;
    }

    let mut total_distance = 0.0f32;
    let mut count = 0;

    for i in 0..population.len() {
        for j in (i + 1)..population.len() {
            total_distance += genome_distance(population[i].genome(), population[j].genome());
            count += 1;
        }
    }

    total_distance / count as f32
}
