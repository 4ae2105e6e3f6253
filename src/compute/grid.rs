//! Bounded occupancy grid.
//!
//! Cells hold agent ids in insertion order; agents themselves live in the
//! population table owned by the simulation.

use std::fmt;

/// Stable agent identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Integer cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    #[inline]
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Grid invariant violations. Any of these indicates a defect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Cell ({x}, {y}) lies outside the grid")]
    BoundsViolation { x: usize, y: usize },
    #[error("Agent {id} is not in cell ({x}, {y})")]
    MissingAgent { id: AgentId, x: usize, y: usize },
    #[error("Agent {id} appears again in cell ({x}, {y})")]
    DuplicateAgent { id: AgentId, x: usize, y: usize },
    #[error("Cell ({x}, {y}) holds unknown agent {id}")]
    StrayAgent { id: AgentId, x: usize, y: usize },
}

/// 2D grid of cells, each an ordered list of occupant ids.
///
/// Data is stored flat with indexing `y * width + x`.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<AgentId>>,
}

impl Grid {
    /// Create an empty grid.
    ///
    /// Panics if `width * height` overflows; `SimulationConfig::validate`
    /// rejects such dimensions before a grid is built.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Vec::new(); width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Cell reached by moving `(dx, dy)` from `pos`, if still on the grid.
    pub fn offset(&self, pos: Position, dx: isize, dy: isize) -> Option<Position> {
        let x = pos.x.checked_add_signed(dx)?;
        let y = pos.y.checked_add_signed(dy)?;
        let target = Position::new(x, y);
        self.contains(target).then_some(target)
    }

    #[inline]
    fn idx(&self, pos: Position) -> Result<usize, GridError> {
        if self.contains(pos) {
            Ok(pos.y * self.width + pos.x)
        } else {
            Err(GridError::BoundsViolation { x: pos.x, y: pos.y })
        }
    }

    /// Ids in a cell, oldest first. Out-of-bounds cells are empty.
    pub fn occupants(&self, pos: Position) -> &[AgentId] {
        match self.idx(pos) {
            Ok(i) => &self.cells[i],
            Err(_) => &[],
        }
    }

    /// Number of agents in a cell. Out-of-bounds cells hold none.
    #[inline]
    pub fn occupancy(&self, pos: Position) -> usize {
        self.occupants(pos).len()
    }

    /// Append an agent to a cell.
    pub fn insert(&mut self, id: AgentId, pos: Position) -> Result<(), GridError> {
        let i = self.idx(pos)?;
        self.cells[i].push(id);
        Ok(())
    }

    /// Remove an agent from a cell, keeping the order of the others.
    pub fn remove(&mut self, id: AgentId, pos: Position) -> Result<(), GridError> {
        let i = self.idx(pos)?;
        let cell = &mut self.cells[i];
        let slot = cell
            .iter()
            .position(|&occupant| occupant == id)
            .ok_or(GridError::MissingAgent {
                id,
                x: pos.x,
                y: pos.y,
            })?;
        cell.remove(slot);
        Ok(())
    }

    /// Move an agent between cells.
    ///
    /// Both cells are checked before anything changes, so a failed call
    /// leaves the grid untouched.
    pub fn relocate(&mut self, id: AgentId, from: Position, to: Position) -> Result<(), GridError> {
        self.idx(to)?;
        self.remove(id, from)?;
        self.insert(id, to)
    }

    /// Total number of ids held across all cells.
    pub fn total_occupancy(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    /// Iterate `(position, occupants)` over every cell.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &[AgentId])> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (Position::new(i % width, i / width), cell.as_slice()))
    }

    /// Occupancy counts shaped `width x height`: `snapshot[x][y]`.
    pub fn snapshot(&self) -> Vec<Vec<usize>> {
        (0..self.width)
            .map(|x| {
                (0..self.height)
                    .map(|y| self.cells[y * self.width + x].len())
                    .collect()
            })
            .collect()
    }

    /// Occupancy counts in flat `y * width + x` order.
    pub fn occupancy_counts(&self) -> Vec<usize> {
        self.cells.iter().map(Vec::len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_occupancy() {
        let mut grid = Grid::new(3, 2);
        grid.insert(AgentId(1), Position::new(2, 1)).unwrap();
        grid.insert(AgentId(2), Position::new(2, 1)).unwrap();

        assert_eq!(grid.occupancy(Position::new(2, 1)), 2);
        assert_eq!(grid.occupants(Position::new(2, 1)), &[AgentId(1), AgentId(2)]);
        assert_eq!(grid.occupancy(Position::new(0, 0)), 0);
        assert_eq!(grid.occupancy(Position::new(3, 0)), 0);
        assert_eq!(grid.total_occupancy(), 2);
    }

    #[test]
    fn test_insert_out_of_bounds() {
        let mut grid = Grid::new(3, 3);
        assert_eq!(
            grid.insert(AgentId(0), Position::new(3, 1)),
            Err(GridError::BoundsViolation { x: 3, y: 1 })
        );
        assert_eq!(grid.total_occupancy(), 0);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut grid = Grid::new(1, 1);
        let pos = Position::new(0, 0);
        for id in 0..4 {
            grid.insert(AgentId(id), pos).unwrap();
        }
        grid.remove(AgentId(1), pos).unwrap();
        assert_eq!(grid.occupants(pos), &[AgentId(0), AgentId(2), AgentId(3)]);

        assert!(matches!(
            grid.remove(AgentId(1), pos),
            Err(GridError::MissingAgent { .. })
        ));
    }

    #[test]
    fn test_relocate_failure_leaves_grid_unchanged() {
        let mut grid = Grid::new(2, 2);
        let from = Position::new(0, 0);
        grid.insert(AgentId(5), from).unwrap();

        assert!(grid.relocate(AgentId(5), from, Position::new(2, 0)).is_err());
        assert_eq!(grid.occupants(from), &[AgentId(5)]);

        grid.relocate(AgentId(5), from, Position::new(1, 1)).unwrap();
        assert_eq!(grid.occupancy(from), 0);
        assert_eq!(grid.occupants(Position::new(1, 1)), &[AgentId(5)]);
    }

    #[test]
    fn test_offset_clips_at_edges() {
        let grid = Grid::new(3, 3);
        let corner = Position::new(0, 0);
        assert_eq!(grid.offset(corner, -1, 0), None);
        assert_eq!(grid.offset(corner, 0, -1), None);
        assert_eq!(grid.offset(corner, 1, 0), Some(Position::new(1, 0)));
        assert_eq!(grid.offset(Position::new(2, 2), 0, 1), None);
        assert_eq!(grid.offset(Position::new(1, 1), 0, 2), None);
    }

    #[test]
    fn test_snapshot_is_width_major() {
        let mut grid = Grid::new(4, 2);
        grid.insert(AgentId(0), Position::new(3, 1)).unwrap();

        let snapshot = grid.snapshot();
        assert_eq!(snapshot.len(), 4);
        assert!(snapshot.iter().all(|column| column.len() == 2));
        assert_eq!(snapshot[3][1], 1);
        assert_eq!(grid.occupancy_counts()[4 + 3], 1);
    }
}
