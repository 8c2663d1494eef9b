//! Terrain grid that owns buildability and path validity.

use tracing::debug;
use wave_defence_core::{CellCoord, PlacementError, Position, TERRAIN_BLOCKED, TERRAIN_EMPTY};

use crate::navigation;

/// Failures raised while constructing a [`GridMap`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The grid has no rows or no columns.
    #[error("grid has no cells")]
    Empty,
    /// A row differs in length from the first row.
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// The start or goal lies outside the grid.
    #[error("{endpoint} cell {cell:?} lies outside the grid")]
    EndpointOutOfBounds {
        /// Either `"start"` or `"goal"`.
        endpoint: &'static str,
        /// The offending cell.
        cell: CellCoord,
    },
}

/// Terrain codes plus the start and goal cells enemies travel between.
///
/// Code `0` is empty and buildable, `1` is an obstacle or tower, and every
/// other code is walkable decoration that cannot be built on.
#[derive(Clone, Debug, PartialEq)]
pub struct GridMap {
    columns: u32,
    rows: u32,
    codes: Vec<i32>,
    start: CellCoord,
    goal: CellCoord,
    tile_size: f32,
}

impl GridMap {
    /// Builds a grid from row-major terrain rows.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] when the rows are empty or ragged, or when an
    /// endpoint lies outside the grid.
    pub fn from_rows(
        rows: &[Vec<i32>],
        start: CellCoord,
        goal: CellCoord,
        tile_size: f32,
    ) -> Result<Self, GridError> {
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(GridError::Empty);
        }

        let mut codes = Vec::with_capacity(expected * rows.len());
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != expected {
                return Err(GridError::Ragged {
                    row,
                    expected,
                    found: cells.len(),
                });
            }
            codes.extend_from_slice(cells);
        }

        let grid = Self {
            columns: u32::try_from(expected).map_err(|_| GridError::Empty)?,
            rows: u32::try_from(rows.len()).map_err(|_| GridError::Empty)?,
            codes,
            start,
            goal,
            tile_size,
        };

        for (endpoint, cell) in [("start", start), ("goal", goal)] {
            if !grid.in_bounds(cell) {
                return Err(GridError::EndpointOutOfBounds { endpoint, cell });
            }
        }

        Ok(grid)
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Cell where enemies spawn.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Cell enemies try to reach.
    #[must_use]
    pub const fn goal(&self) -> CellCoord {
        self.goal
    }

    /// Side length of a cell in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Terrain codes in row-major order.
    #[must_use]
    pub fn codes(&self) -> &[i32] {
        &self.codes
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Terrain code of the cell, if it lies inside the grid.
    #[must_use]
    pub fn terrain(&self, cell: CellCoord) -> Option<i32> {
        self.index(cell).and_then(|index| self.codes.get(index).copied())
    }

    /// Reports whether enemies may walk through the cell.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.terrain(cell).is_some_and(|code| code != TERRAIN_BLOCKED)
    }

    /// Reports whether a tower may be built on the cell.
    #[must_use]
    pub fn is_buildable(&self, cell: CellCoord) -> bool {
        self.terrain(cell).is_some_and(|code| code == TERRAIN_EMPTY)
    }

    /// Computes a shortest walkable path from the start to the goal.
    #[must_use]
    pub fn find_path(&self) -> Option<Vec<CellCoord>> {
        navigation::find_path(self.columns, self.rows, self.start, self.goal, |cell| {
            !self.is_walkable(cell)
        })
    }

    /// Blocks the cell for a tower unless doing so disconnects start and goal.
    ///
    /// The grid is left untouched whenever an error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::OutOfBounds`], [`PlacementError::NotBuildable`]
    /// or [`PlacementError::BlocksPath`].
    pub fn try_place_tower(&mut self, cell: CellCoord) -> Result<(), PlacementError> {
        let Some(index) = self.index(cell) else {
            return Err(PlacementError::OutOfBounds);
        };

        if self.codes[index] != TERRAIN_EMPTY {
            return Err(PlacementError::NotBuildable);
        }

        self.codes[index] = TERRAIN_BLOCKED;
        if self.find_path().is_none() {
            self.codes[index] = TERRAIN_EMPTY;
            debug!(column = cell.column(), row = cell.row(), "placement would seal the goal");
            return Err(PlacementError::BlocksPath);
        }

        Ok(())
    }

    /// Frees a blocked cell so it becomes buildable again.
    ///
    /// Returns `false` when the cell was not blocked.
    pub fn remove_tower(&mut self, cell: CellCoord) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };

        if self.codes[index] != TERRAIN_BLOCKED {
            return false;
        }

        self.codes[index] = TERRAIN_EMPTY;
        true
    }

    /// World-space centre of the cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Position {
        cell.center(self.tile_size)
    }

    /// Cell containing the world-space position, if it lies on the grid.
    #[must_use]
    pub fn cell_at(&self, position: Position) -> Option<CellCoord> {
        if self.tile_size <= 0.0 || position.x < 0.0 || position.y < 0.0 {
            return None;
        }

        let cell = CellCoord::new(
            (position.x / self.tile_size) as u32,
            (position.y / self.tile_size) as u32,
        );
        self.in_bounds(cell).then_some(cell)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }

        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}
