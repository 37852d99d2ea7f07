use std::ops::Range;

use crate::agent::{AgentId, CellId};
use crate::error::{require_positive, ConfigError, ConfigResult};

/// Upper bound on grid cells. Larger grids are rejected at construction.
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// Uniform toroidal grid over the world rectangle.
///
/// Cell size equals the interaction radius, so the 3x3 block around an
/// agent's cell holds every agent it can interact with. Cells are indexed
/// column-major: `id = column * height + row`, which keeps each column's
/// cells contiguous for the slice partition in the force pass.
pub struct SpatialGrid {
    cell_size: f64,
    world_width: f64,
    world_height: f64,
    /// Number of columns.
    width: usize,
    /// Number of rows.
    height: usize,
    /// Agent ids per cell. Pre-allocated, cleared each rebuild.
    cells: Vec<Vec<AgentId>>,
}

impl SpatialGrid {
    pub fn new(world_width: f64, world_height: f64, cell_size: f64) -> ConfigResult<Self> {
        let world_width = require_positive("world width", world_width)?;
        let world_height = require_positive("world height", world_height)?;
        let cell_size = require_positive("cell size", cell_size)?;

        // Casts saturate, so absurd ratios end up rejected below.
        let width = ((world_width / cell_size).ceil() as usize).max(1);
        let height = ((world_height / cell_size).ceil() as usize).max(1);
        let count = width
            .checked_mul(height)
            .filter(|&count| count <= MAX_GRID_CELLS)
            .ok_or(ConfigError::GridTooLarge {
                columns: width,
                rows: height,
                max: MAX_GRID_CELLS,
            })?;

        let mut cells = Vec::with_capacity(count);
        for _ in 0..count {
            // Keeps allocation across rebuilds.
            cells.push(Vec::with_capacity(4));
        }

        log::debug!(
            "spatial grid {}x{} cells of size {} over {}x{} world",
            width,
            height,
            cell_size,
            world_width,
            world_height
        );

        Ok(Self {
            cell_size,
            world_width,
            world_height,
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// True if the point lies strictly inside the world: `(0, width) x (0, height)`.
    /// Only such agents are placed on the grid.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x > 0.0 && x < self.world_width && y > 0.0 && y < self.world_height
    }

    /// Cell id for a world position. Coordinates are clamped onto the grid.
    pub fn cell_of(&self, x: f64, y: f64) -> CellId {
        // Float-to-int casts saturate, so negatives and NaN land on 0.
        let column = ((x / self.cell_size).floor() as usize).min(self.width - 1);
        let row = ((y / self.cell_size).floor() as usize).min(self.height - 1);
        column * self.height + row
    }

    /// Empty one cell.
    pub fn clear(&mut self, cell: CellId) {
        self.cells[cell].clear();
    }

    /// Empty every cell.
    pub fn clear_all(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Append an agent to the cell covering `(x, y)` and return that cell.
    pub fn insert(&mut self, x: f64, y: f64, agent: AgentId) -> CellId {
        let cell = self.cell_of(x, y);
        self.cells[cell].push(agent);
        cell
    }

    /// Agents currently recorded in a cell.
    pub fn cell(&self, cell: CellId) -> &[AgentId] {
        &self.cells[cell]
    }

    /// Cell ids covered by a half-open column range.
    pub fn column_cells(&self, columns: Range<usize>) -> Range<CellId> {
        columns.start * self.height..columns.end * self.height
    }

    /// Total agents across all cells.
    pub fn occupancy(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    /// The cell itself plus its 8 neighbors, wrapping on both axes.
    ///
    /// On grids narrower than 3 cells some ids repeat.
    pub fn neighbors_of(&self, cell: CellId) -> [CellId; 9] {
        let h = self.height;
        let column = cell / h;
        let row = cell % h;

        let north = if row == 0 { h - 1 } else { row - 1 };
        let south = if row == h - 1 { 0 } else { row + 1 };
        let west = if column == 0 { self.width - 1 } else { column - 1 };
        let east = if column == self.width - 1 { 0 } else { column + 1 };

        [
            cell,
            column * h + north,
            column * h + south,
            west * h + row,
            west * h + north,
            west * h + south,
            east * h + row,
            east * h + north,
            east * h + south,
        ]
    }

    /// `neighbors_of` with repeats removed, for grids narrower than 3 cells.
    pub fn distinct_neighbors_of(&self, cell: CellId) -> ([CellId; 9], usize) {
        let mut ids = self.neighbors_of(cell);
        if self.width >= 3 && self.height >= 3 {
            return (ids, 9);
        }
        ids.sort_unstable();
        let mut len = 0;
        for i in 0..ids.len() {
            if len == 0 || ids[len - 1] != ids[i] {
                ids[len] = ids[i];
                len += 1;
            }
        }
        (ids, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_non_positive_arguments() {
        assert!(SpatialGrid::new(0.0, 10.0, 1.0).is_err());
        assert!(SpatialGrid::new(10.0, -1.0, 1.0).is_err());
        assert!(SpatialGrid::new(10.0, 10.0, 0.0).is_err());
        assert!(SpatialGrid::new(10.0, 10.0, f64::NAN).is_err());
    }

    #[test]
    fn dimensions_round_up() {
        let grid = SpatialGrid::new(300.0, 302.0, 5.0).unwrap();
        assert_eq!(grid.width(), 60);
        assert_eq!(grid.height(), 61);
        assert_eq!(grid.cell_count(), 60 * 61);
    }

    #[test]
    fn insert_uses_column_major_ids() {
        let mut grid = SpatialGrid::new(100.0, 50.0, 10.0).unwrap();
        let cell = grid.insert(23.0, 7.5, 4);
        assert_eq!(cell, 2 * grid.height());
        let cell = grid.insert(5.0, 45.0, 9);
        assert_eq!(cell, 4);
        assert_eq!(grid.cell(2 * grid.height()), &[4]);
        assert_eq!(grid.occupancy(), 2);
    }

    #[test]
    fn clear_and_reuse() {
        let mut grid = SpatialGrid::new(100.0, 100.0, 10.0).unwrap();
        let a = grid.insert(50.0, 50.0, 42);
        let b = grid.insert(15.0, 15.0, 7);
        grid.clear(a);
        assert!(grid.cell(a).is_empty());
        assert_eq!(grid.cell(b), &[7]);
        grid.clear_all();
        assert_eq!(grid.occupancy(), 0);
    }

    #[test]
    fn corner_neighbors_wrap() {
        let grid = SpatialGrid::new(40.0, 30.0, 10.0).unwrap();
        // 4 columns x 3 rows, cell 0 is column 0 row 0.
        let mut ids = grid.neighbors_of(0).to_vec();
        ids.sort_unstable();
        // columns {3, 0, 1} x rows {2, 0, 1}
        let mut expected = vec![0, 1, 2, 3, 4, 5, 9, 10, 11];
        expected.sort_unstable();
        assert_eq!(ids, expected);
    }

    #[test]
    fn tiny_grid_dedups_neighbors() {
        let grid = SpatialGrid::new(10.0, 20.0, 10.0).unwrap();
        // 1 column x 2 rows
        let (ids, len) = grid.distinct_neighbors_of(0);
        assert_eq!(&ids[..len], &[0, 1]);
    }

    #[test]
    fn edge_positions_stay_on_grid() {
        let grid = SpatialGrid::new(10.0, 10.0, 3.0).unwrap();
        assert!(grid.cell_of(9.999_999, 9.999_999) < grid.cell_count());
        assert_eq!(grid.cell_of(-1.0, -1.0), 0);
        assert!(grid.contains(0.5, 9.5));
        assert!(!grid.contains(0.0, 5.0));
        assert!(!grid.contains(5.0, 0.0));
        assert!(!grid.contains(10.0, 5.0));
        assert!(!grid.contains(5.0, 10.0));
    }

    #[test]
    fn cell_of_floors_the_quotient() {
        let grid = SpatialGrid::new(1.0, 1.0, 0.1).unwrap();
        // 0.3 / 0.1 is just under 3, while 0.3 * (1 / 0.1) rounds up to 3.
        assert_eq!(grid.cell_of(0.3, 0.05) / grid.height(), 2);
        assert_eq!(grid.cell_of(0.05, 0.3) % grid.height(), 2);
    }

    #[test]
    fn oversized_grid_is_a_config_error() {
        assert!(matches!(
            SpatialGrid::new(1e6, 1e6, 1e-3),
            Err(ConfigError::GridTooLarge { .. })
        ));
        assert!(matches!(
            SpatialGrid::new(1e300, 1e300, 1e-300),
            Err(ConfigError::GridTooLarge { .. })
        ));
        // One column past the cap.
        let side = (1usize << 12) as f64;
        assert!(matches!(
            SpatialGrid::new(side + 1.0, side, 1.0),
            Err(ConfigError::GridTooLarge { columns: 4097, rows: 4096, .. })
        ));
    }

    proptest! {
        #[test]
        fn neighbors_are_valid_and_symmetric(
            w in 1usize..12,
            h in 1usize..12,
            pick in 0usize..144,
        ) {
            let grid = SpatialGrid::new(w as f64, h as f64, 1.0).unwrap();
            let cell = pick % grid.cell_count();
            let ids = grid.neighbors_of(cell);
            prop_assert_eq!(ids[0], cell);
            for &id in &ids {
                prop_assert!(id < grid.cell_count());
                prop_assert!(grid.neighbors_of(id).contains(&cell));
            }
        }
    }
}
