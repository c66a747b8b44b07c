//! Shared occupancy blackboard used by the [`crate::avoidance::indirect`]
//! strategy.
//!
//! No pairwise communication happens here: every alive agent writes its own
//! reservations, then every agent reads the accumulated board. Owned
//! exclusively by one `Indirect` strategy instance and torn down when the
//! strategy is swapped (§5).

use std::collections::HashMap;

use crate::grid::Cell;

/// One reservation of a cell by an agent, valid through `expires_at_tick`
/// inclusive.
#[derive(Debug, Clone, Copy)]
pub struct Reservation {
    /// The agent that made the reservation.
    pub owner_id: u32,
    /// Last tick this reservation is valid for.
    pub expires_at_tick: u32,
}

/// A shared map from cell to the reservations currently held on it.
///
/// The source computed expiry with float arithmetic (`current_tick + 1.5`)
/// against an integer tick counter; per the Open Question in §9 this crate
/// uses plain integer expiry (`current_tick + 2`) to mean "valid through the
/// next tick too", removing the float/int mix.
#[derive(Debug, Default)]
pub struct OccupancyGrid {
    width: i32,
    height: i32,
    reservations: HashMap<Cell, Vec<Reservation>>,
}

impl OccupancyGrid {
    /// Create an empty occupancy grid sized to match a [`crate::grid::Grid`].
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            reservations: HashMap::new(),
        }
    }

    #[inline]
    fn in_bounds(&self, cell: Cell) -> bool {
        cell.col >= 0 && cell.row >= 0 && cell.col < self.width && cell.row < self.height
    }

    /// Purge all reservations that expired before `current_tick`. Must be
    /// called once at the start of every tick, before any writes.
    pub fn begin_tick(&mut self, current_tick: u32) {
        self.reservations.retain(|_, list| {
            list.retain(|r| r.expires_at_tick >= current_tick);
            !list.is_empty()
        });
    }

    /// Reserve `cell` for `owner_id` through `expires_at_tick`. Cells outside
    /// the grid are silently ignored.
    pub fn reserve(&mut self, cell: Cell, owner_id: u32, expires_at_tick: u32) {
        if !self.in_bounds(cell) {
            return;
        }
        self.reservations
            .entry(cell)
            .or_default()
            .push(Reservation {
                owner_id,
                expires_at_tick,
            });
    }

    /// Count reservations on `cell` held by agents other than `owner_id`.
    #[must_use]
    pub fn foreign_occupancy(&self, cell: Cell, owner_id: u32) -> usize {
        self.reservations
            .get(&cell)
            .map(|list| list.iter().filter(|r| r.owner_id != owner_id).count())
            .unwrap_or(0)
    }

    /// Whether any agent other than `owner_id` holds a reservation on `cell`.
    #[must_use]
    pub fn is_foreign_occupied(&self, cell: Cell, owner_id: u32) -> bool {
        self.foreign_occupancy(cell, owner_id) > 0
    }
}
