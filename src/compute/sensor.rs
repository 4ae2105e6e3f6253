//! Population-density perception.

use super::genome::INPUT_SIZE;
use super::grid::{Grid, Position};

/// How many cells an agent sees along each direction.
pub const VISION_RANGE: isize = 2;

/// Sensing directions in input order: left, right, backward, forward.
///
/// These are fixed world axes; note the order differs from the action order.
pub const SENSE_DIRECTIONS: [(isize, isize); INPUT_SIZE] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Mean occupancy of the cells at distance `1..=VISION_RANGE` in each
/// direction, skipping cells off the grid.
///
/// A direction with no on-grid cells reads exactly 0. The agent's own cell
/// is never sampled.
pub fn sense_densities(grid: &Grid, pos: Position) -> [f32; INPUT_SIZE] {
    let mut densities = [0.0f32; INPUT_SIZE];

    for (density, &(dx, dy)) in densities.iter_mut().zip(SENSE_DIRECTIONS.iter()) {
        let mut count = 0usize;
        let mut samples = 0usize;
        for distance in 1..=VISION_RANGE {
            if let Some(cell) = grid.offset(pos, dx * distance, dy * distance) {
                samples += 1;
                count += grid.occupancy(cell);
            }
        }
        if samples > 0 {
            *density = count as f32 / samples as f32;
        }
    }

    densities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::AgentId;

    #[test]
    fn test_lone_agent_senses_nothing() {
        let mut grid = Grid::new(5, 5);
        let pos = Position::new(2, 2);
        grid.insert(AgentId(0), pos).unwrap();
        assert_eq!(sense_densities(&grid, pos), [0.0; 4]);
    }

    #[test]
    fn test_own_cell_and_diagonals_ignored() {
        let mut grid = Grid::new(5, 5);
        let pos = Position::new(2, 2);
        for id in 0..3 {
            grid.insert(AgentId(id), pos).unwrap();
        }
        grid.insert(AgentId(9), Position::new(3, 3)).unwrap();
        assert_eq!(sense_densities(&grid, pos), [0.0; 4]);
    }

    #[test]
    fn test_directional_averages() {
        let mut grid = Grid::new(5, 5);
        let pos = Position::new(2, 2);
        // left: 2 agents at distance 1, 1 at distance 2
        grid.insert(AgentId(0), Position::new(1, 2)).unwrap();
        grid.insert(AgentId(1), Position::new(1, 2)).unwrap();
        grid.insert(AgentId(2), Position::new(0, 2)).unwrap();
        // forward (+y): 1 agent at distance 2
        grid.insert(AgentId(3), Position::new(2, 4)).unwrap();

        let densities = sense_densities(&grid, pos);
        assert_eq!(densities, [1.5, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_edges_average_over_in_bounds_cells() {
        let mut grid = Grid::new(3, 3);
        let pos = Position::new(1, 0);
        grid.insert(AgentId(0), Position::new(0, 0)).unwrap();
        grid.insert(AgentId(1), Position::new(1, 1)).unwrap();

        let densities = sense_densities(&grid, pos);
        // left has one in-bounds cell holding one agent
        assert_eq!(densities[0], 1.0);
        // backward runs straight off the grid
        assert_eq!(densities[2], 0.0);
        // forward: cells (1,1) and (1,2)
        assert_eq!(densities[3], 0.5);
    }

    #[test]
    fn test_corner_on_unit_grid() {
        let mut grid = Grid::new(1, 1);
        let pos = Position::new(0, 0);
        grid.insert(AgentId(0), pos).unwrap();
        assert_eq!(sense_densities(&grid, pos), [0.0; 4]);
    }
}
