//! Agents: a genome, its decoded policy and a position.

use super::genome::{Genome, GenomeRng, ShapeError};
use super::grid::{AgentId, Grid, GridError, Position};
use super::policy::{Action, PolicyWeights};
use super::sensor::sense_densities;

/// A single animal on the grid.
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    position: Position,
    genome: Genome,
    /// Decoded from `genome` at construction.
    policy: PolicyWeights,
}

impl Agent {
    /// Create an agent, decoding its policy from the genome.
    pub fn new(id: AgentId, position: Position, genome: Genome) -> Result<Self, ShapeError> {
        let policy = PolicyWeights::decode(&genome)?;
        Ok(Self {
            id,
            position,
            genome,
            policy,
        })
    }

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    #[inline]
    pub fn policy(&self) -> &PolicyWeights {
        &self.policy
    }

    /// Sense the grid and choose an action.
    pub fn decide(&self, grid: &Grid) -> Action {
        self.policy.decide(&sense_densities(grid, self.position))
    }

    /// Apply an action to this agent and the grid.
    ///
    /// A target off the grid is a no-op, not an error. Returns whether the
    /// agent changed cells.
    pub fn apply(&mut self, action: Action, grid: &mut Grid) -> Result<bool, GridError> {
        let (dx, dy) = action.displacement();
        if (dx, dy) == (0, 0) {
            return Ok(false);
        }
        let Some(target) = grid.offset(self.position, dx, dy) else {
            return Ok(false);
        };

        grid.relocate(self.id, self.position, target)?;
        self.position = target;
        Ok(true)
    }

    /// Sense, decide and move against the live grid.
    pub fn think_and_act(&mut self, grid: &mut Grid) -> Result<Action, GridError> {
        let action = self.decide(grid);
        self.apply(action, grid)?;
        Ok(action)
    }

    /// New agent at this agent's position with a mutated copy of its genome.
    pub fn offspring(
        &self,
        id: AgentId,
        rng: &mut GenomeRng,
        rate: f32,
        sigma: f32,
    ) -> Result<Agent, ShapeError> {
        Agent::new(id, self.position, rng.mutate(&self.genome, rate, sigma))
    }
}
