//! Addressable 2D cell topology shared by rectangular and hexagonal grids.
//!
//! Grounded on the teacher's `rts_core::pathfinding::NavGrid` (row-major cell
//! storage, `in_bounds`/`is_walkable` guards that never panic on an
//! out-of-range query) generalized to two topologies per §4.1 of the design
//! notes.

use crate::error::{Result, SimError};
use crate::math::Vec2;

/// A cell address on a grid. Equality and hashing are structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// Column.
    pub col: i32,
    /// Row.
    pub row: i32,
}

impl Cell {
    /// Create a new cell address.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

/// Grid topology: how cells connect to their neighbors and map to world
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Topology {
    /// 4-connected rectangular grid.
    Rectangular,
    /// 6-connected hexagonal grid, pointy-top, odd-q column offset.
    HexPointyTopOddQ,
}

/// Rectangular 4-connected neighbor offsets (N, E, S, W).
const RECT_DIRS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Hex neighbor offsets for even columns: N, NE, SE, S, SW, NW.
const HEX_EVEN_COL_DIRS: [(i32, i32); 6] = [(0, -1), (1, -1), (1, 0), (0, 1), (-1, 0), (-1, -1)];

/// Hex neighbor offsets for odd columns: N, NE, SE, S, SW, NW.
const HEX_ODD_COL_DIRS: [(i32, i32); 6] = [(0, -1), (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0)];

/// A rectangular or hexagonal grid of cells, each either walkable or blocked.
///
/// Constructed once per scenario; mutated only by [`Grid::set_obstacle`], and
/// treated as read-only during a simulation tick (§5).
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    cell_size: f32,
    topology: Topology,
    blocked: Vec<bool>,
}

impl Grid {
    /// Create a new grid with all cells walkable.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidGridDimensions`] if `width` or `height` is
    /// not positive, or [`SimError::InvalidCellSize`] if `cell_size` is not
    /// positive.
    pub fn new(topology: Topology, width: i32, height: i32, cell_size: f32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(SimError::InvalidGridDimensions { width, height });
        }
        if !(cell_size > 0.0) {
            return Err(SimError::InvalidCellSize(format!("{cell_size}")));
        }

        let cell_count = (width as usize) * (height as usize);
        Ok(Self {
            width,
            height,
            cell_size,
            topology,
            blocked: vec![false; cell_count],
        })
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Size of one cell in world (pixel) units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// The grid's topology.
    #[must_use]
    pub const fn topology(&self) -> Topology {
        self.topology
    }

    #[inline]
    fn in_bounds(&self, cell: Cell) -> bool {
        cell.col >= 0 && cell.row >= 0 && cell.col < self.width && cell.row < self.height
    }

    #[inline]
    fn index(&self, cell: Cell) -> usize {
        (cell.row as usize) * (self.width as usize) + (cell.col as usize)
    }

    /// Mark a cell blocked or walkable. Idempotent; out-of-range cells are
    /// silently ignored (§4.1: writes are never fatal).
    pub fn set_obstacle(&mut self, cell: Cell, blocked: bool) {
        if self.in_bounds(cell) {
            let idx = self.index(cell);
            self.blocked[idx] = blocked;
        }
    }

    /// Whether `cell` can be walked on. Cells outside the grid are never
    /// walkable.
    #[must_use]
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && !self.blocked[self.index(cell)]
    }

    /// Enumerate the walkable neighbors of `cell` (4-connected rectangular,
    /// or 6-connected hex with column-parity-dependent offsets).
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        let dirs: &'static [(i32, i32)] = match self.topology {
            Topology::Rectangular => &RECT_DIRS,
            Topology::HexPointyTopOddQ => {
                if cell.col.rem_euclid(2) == 0 {
                    &HEX_EVEN_COL_DIRS
                } else {
                    &HEX_ODD_COL_DIRS
                }
            }
        };
        dirs.iter()
            .map(move |&(dcol, drow)| Cell::new(cell.col + dcol, cell.row + drow))
            .filter(move |&c| self.is_walkable(c))
    }

    /// Convert a cell address to its world-space center point.
    #[must_use]
    pub fn cell_to_world(&self, cell: Cell) -> Vec2 {
        let s = self.cell_size;
        match self.topology {
            Topology::Rectangular => Vec2::new(
                (cell.col as f32 + 0.5) * s,
                (cell.row as f32 + 0.5) * s,
            ),
            Topology::HexPointyTopOddQ => {
                let r = s / 2.0;
                let sqrt3 = 3f32.sqrt();
                let x = cell.col as f32 * sqrt3 * r + (sqrt3 * r) / 2.0;
                let mut y = cell.row as f32 * 1.5 * r + r;
                if cell.col.rem_euclid(2) == 1 {
                    y += 0.75 * r;
                }
                Vec2::new(x, y)
            }
        }
    }

    /// Convert a world-space point to its containing cell.
    #[must_use]
    pub fn world_to_cell(&self, point: Vec2) -> Cell {
        match self.topology {
            Topology::Rectangular => {
                Cell::new((point.x / self.cell_size).floor() as i32, (point.y / self.cell_size).floor() as i32)
            }
            Topology::HexPointyTopOddQ => self.world_to_hex_cell(point),
        }
    }

    /// Hex `world_to_cell`: seed with nearest spacing, then refine over the
    /// surrounding 3x3 neighborhood by pixel distance to each candidate's
    /// center. The refinement is required: integer division alone produces
    /// the wrong cell near seams between columns (§4.1).
    fn world_to_hex_cell(&self, point: Vec2) -> Cell {
        let r = self.cell_size / 2.0;
        let sqrt3 = 3f32.sqrt();

        let seed_col = (point.x / (sqrt3 * r)).round() as i32;
        let seed_row = (point.y / (1.5 * r)).round() as i32;

        let mut best = Cell::new(seed_col, seed_row);
        let mut best_dist_sq = f32::MAX;

        for dcol in -1..=1 {
            for drow in -1..=1 {
                let candidate = Cell::new(seed_col + dcol, seed_row + drow);
                let center = self.cell_to_world(candidate);
                let dist_sq = center.distance_squared(point);
                if dist_sq < best_dist_sq {
                    best_dist_sq = dist_sq;
                    best = candidate;
                }
            }
        }

        best
    }
}
