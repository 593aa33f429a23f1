//! Puzzle data model.
//!
//! This module contains the immutable description of a playable level: the grid size, the colored
//! endpoints placed on it and the level's display name. Levels are only ever built by the
//! [`validator`](crate::validator), so every [`Level`] in circulation satisfies the pairing and
//! placement rules of the level format.

use serde::{Deserialize, Serialize};

/// Smallest accepted side length of the square grid.
pub const MIN_GRID_SIZE: u8 = 5;

/// Largest accepted side length of the square grid.
pub const MAX_GRID_SIZE: u8 = 14;

/// Identifier of a color pair.
///
/// Colors are numbered from zero in the order in which their pair appears in the level definition.
pub type ColorId = usize;

/// Position of a single square on the board.
///
/// Coordinates are signed so that positions outside the board can still be described; pointer
/// input that leaves the board is reported with such coordinates and the engine reacts to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Horizontal position, counted from the left edge.
    pub column: i32,
    /// Vertical position, counted from the top edge.
    pub row: i32,
}

impl Cell {
    /// Builds a cell from its column and row.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Returns whether both cells share a side.
    ///
    /// Two cells are adjacent when they lie on the same row or the same column and their Manhattan
    /// distance is exactly one. A cell is never adjacent to itself.
    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        let column_gap = self.column.abs_diff(other.column);
        let row_gap = self.row.abs_diff(other.row);

        (column_gap == 1 && row_gap == 0) || (column_gap == 0 && row_gap == 1)
    }
}

/// Colored dot that a path must start or end on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Square the dot sits on.
    pub cell: Cell,
    /// Pair the dot belongs to.
    pub color: ColorId,
}

/// Validated, immutable level.
///
/// A level holds a square grid of side [`size`](Level::size) and an ordered list of endpoints in
/// document order. Grouping the endpoints by color yields exactly one pair per color, and no two
/// endpoints share a square.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    /// Side length of the grid.
    size: u8,
    /// Endpoints in document order.
    endpoints: Vec<Endpoint>,
    /// Display name, empty when the definition carried none.
    name: String,
}

impl Level {
    /// Assembles a level from parts that have already passed validation.
    pub(crate) const fn from_validated(size: u8, endpoints: Vec<Endpoint>, name: String) -> Self {
        Self {
            size,
            endpoints,
            name,
        }
    }

    /// Returns the side length of the grid.
    #[must_use]
    pub const fn size(&self) -> u8 {
        self.size
    }

    /// Returns the number of squares on the board.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        usize::from(self.size) * usize::from(self.size)
    }

    /// Returns all endpoints in document order.
    #[must_use]
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Returns the display name of the level, which may be empty.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of color pairs.
    #[must_use]
    pub fn color_count(&self) -> usize {
        self.endpoints.len() / 2
    }

    /// Returns whether the cell lies on the board.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        let bound = i32::from(self.size);

        (0..bound).contains(&cell.column) && (0..bound).contains(&cell.row)
    }

    /// Returns the endpoint sitting on the cell, if any.
    #[must_use]
    pub fn endpoint_at(&self, cell: Cell) -> Option<&Endpoint> {
        self.endpoints.iter().find(|endpoint| endpoint.cell == cell)
    }

    /// Returns both squares of a color pair in document order.
    #[must_use]
    pub fn pair(&self, color: ColorId) -> Option<(Cell, Cell)> {
        let mut cells = self
            .endpoints
            .iter()
            .filter(|endpoint| endpoint.color == color)
            .map(|endpoint| endpoint.cell);

        Some((cells.next()?, cells.next()?))
    }

    /// Returns the endpoint paired with the one on `cell`.
    ///
    /// This is the square a stroke started on `cell` has to reach in order to be committed.
    #[must_use]
    pub fn partner_of(&self, cell: Cell) -> Option<Cell> {
        let color = self.endpoint_at(cell)?.color;
        let (first, second) = self.pair(color)?;

        if first == cell {
            Some(second)
        } else {
            Some(first)
        }
    }

    /// Returns the linear index of an in-bounds cell in row-major order.
    pub(crate) fn index_of(&self, cell: Cell) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let column = usize::try_from(cell.column).ok()?;
        let row = usize::try_from(cell.row).ok()?;

        Some(row * usize::from(self.size) + column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds the two-color 5x5 level used throughout these tests.
    fn create_test_level() -> Level {
        Level::from_validated(
            5,
            vec![
                Endpoint {
                    cell: Cell::new(0, 0),
                    color: 0,
                },
                Endpoint {
                    cell: Cell::new(4, 4),
                    color: 0,
                },
                Endpoint {
                    cell: Cell::new(0, 4),
                    color: 1,
                },
                Endpoint {
                    cell: Cell::new(4, 0),
                    color: 1,
                },
            ],
            "corners".to_owned(),
        )
    }

    #[test]
    fn test_cell_adjacency() {
        let origin = Cell::new(2, 2);

        assert!(origin.is_adjacent(Cell::new(1, 2)));
        assert!(origin.is_adjacent(Cell::new(3, 2)));
        assert!(origin.is_adjacent(Cell::new(2, 1)));
        assert!(origin.is_adjacent(Cell::new(2, 3)));

        assert!(!origin.is_adjacent(origin));
        assert!(!origin.is_adjacent(Cell::new(3, 3)));
        assert!(!origin.is_adjacent(Cell::new(4, 2)));
    }

    #[test]
    fn test_cell_adjacency_outside_board() {
        assert!(Cell::new(0, 0).is_adjacent(Cell::new(-1, 0)));
        assert!(Cell::new(0, 0).is_adjacent(Cell::new(0, -1)));
    }

    #[test]
    fn test_level_contains() {
        let level = create_test_level();

        assert!(level.contains(Cell::new(0, 0)));
        assert!(level.contains(Cell::new(4, 4)));
        assert!(!level.contains(Cell::new(5, 0)));
        assert!(!level.contains(Cell::new(0, -1)));
    }

    #[test]
    fn test_level_pairs_and_partners() {
        let level = create_test_level();

        assert_eq!(level.color_count(), 2);
        assert_eq!(level.cell_count(), 25);
        assert_eq!(level.pair(0), Some((Cell::new(0, 0), Cell::new(4, 4))));
        assert_eq!(level.pair(1), Some((Cell::new(0, 4), Cell::new(4, 0))));
        assert_eq!(level.pair(2), None);

        assert_eq!(level.partner_of(Cell::new(4, 4)), Some(Cell::new(0, 0)));
        assert_eq!(level.partner_of(Cell::new(0, 4)), Some(Cell::new(4, 0)));
        assert_eq!(level.partner_of(Cell::new(2, 2)), None);
    }

    #[test]
    fn test_level_index_of() {
        let level = create_test_level();

        assert_eq!(level.index_of(Cell::new(0, 0)), Some(0));
        assert_eq!(level.index_of(Cell::new(4, 0)), Some(4));
        assert_eq!(level.index_of(Cell::new(0, 1)), Some(5));
        assert_eq!(level.index_of(Cell::new(4, 4)), Some(24));
        assert_eq!(level.index_of(Cell::new(5, 4)), None);
    }
}
