//! Indirect (shared occupancy blackboard) avoidance (§4.4.b).
//!
//! Agents never see each other's positions or velocities; they only read and
//! write cell reservations on a shared [`OccupancyGrid`]. Every tick runs
//! four phases in order: `begin_tick` (purge expired reservations), write
//! (every agent reserves its current cell plus the `reservation_radius`
//! Chebyshev ring around it), intent (every agent reserves cells ahead of it
//! along its preferred heading), and read (each agent accumulates a
//! perpendicular avoidance force from occupied look-ahead cells plus a small
//! repulsion from its occupied 3x3 neighborhood).

use crate::grid::Cell;
use crate::math::Vec2;
use crate::occupancy::OccupancyGrid;

use super::AgentView;

/// Tunable parameters. Defaults per §4.4.b: `cell_size = 2 * agent_radius`
/// is resolved at [`IndirectStrategy::initialize`] time since it depends on
/// the scenario's agent radius.
#[derive(Debug, Clone, Copy)]
pub struct IndirectConfig {
    /// World units per grid cell.
    pub cell_size: f32,
    /// Chebyshev ring radius swept during the write phase.
    pub reservation_radius: i32,
    /// Number of cells reserved ahead along the preferred heading during the
    /// intent phase, and scanned during the read phase.
    pub look_ahead_cells: i32,
    /// Scale of the perpendicular avoidance force.
    pub avoidance_strength: f32,
}

impl Default for IndirectConfig {
    fn default() -> Self {
        Self {
            cell_size: 16.0,
            reservation_radius: 1,
            look_ahead_cells: 2,
            avoidance_strength: 0.8,
        }
    }
}

/// Per-tick statistics, additive diagnostics not present in `MetricRecord`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndirectTickStats {
    /// Number of agents that accumulated a non-zero avoidance force this
    /// tick (look-ahead occupancy or neighborhood repulsion).
    pub deflected_count: u32,
}

/// The shared-blackboard strategy.
#[derive(Debug)]
pub struct IndirectStrategy {
    config: IndirectConfig,
    board: OccupancyGrid,
    tick: u32,
    last_stats: IndirectTickStats,
}

impl IndirectStrategy {
    /// Construct a strategy with a blackboard sized to the scenario's grid.
    #[must_use]
    pub fn new(grid_width: i32, grid_height: i32) -> Self {
        Self {
            config: IndirectConfig::default(),
            board: OccupancyGrid::new(grid_width, grid_height),
            tick: 0,
            last_stats: IndirectTickStats::default(),
        }
    }

    /// Statistics recorded by the most recent [`IndirectStrategy::step`] call.
    #[must_use]
    pub fn last_stats(&self) -> IndirectTickStats {
        self.last_stats
    }

    pub(super) fn initialize(&mut self, _tick_dt: f32, agent_radius: f32, _max_speed: f32) {
        self.config.cell_size = 2.0 * agent_radius;
        self.tick = 0;
    }

    fn to_cell(&self, position: Vec2) -> Cell {
        Cell::new(
            (position.x / self.config.cell_size).floor() as i32,
            (position.y / self.config.cell_size).floor() as i32,
        )
    }

    /// Reserve `cell` and the Chebyshev ring of radius `reservation_radius`
    /// around it for `owner_id`.
    fn reserve_ring(&mut self, center: Cell, owner_id: u32, expires_at_tick: u32) {
        let r = self.config.reservation_radius;
        for dcol in -r..=r {
            for drow in -r..=r {
                self.board.reserve(
                    Cell::new(center.col + dcol, center.row + drow),
                    owner_id,
                    expires_at_tick,
                );
            }
        }
    }

    pub(super) fn step(&mut self, agents: &[AgentView], preferred: &[Vec2]) -> Vec<Vec2> {
        self.tick += 1;
        self.board.begin_tick(self.tick);

        if agents.is_empty() {
            self.last_stats = IndirectTickStats::default();
            return Vec::new();
        }

        // Write phase: current cell + Chebyshev ring, expiry "valid through
        // the next tick too" (Open Question in §9: integer `tick + 2`
        // instead of the source's `tick + 1.5`).
        let current_cells: Vec<Cell> = agents.iter().map(|a| self.to_cell(a.position)).collect();
        for (agent, &cell) in agents.iter().zip(&current_cells) {
            self.reserve_ring(cell, agent.id, self.tick + 2);
        }

        // Intent phase: reserve `look_ahead_cells` cells along each agent's
        // preferred heading.
        let look_ahead_lines: Vec<Vec<Cell>> = agents
            .iter()
            .zip(preferred)
            .zip(&current_cells)
            .map(|((_, pref), &start_cell)| {
                self.look_ahead_line(start_cell, *pref, self.config.look_ahead_cells)
            })
            .collect();
        for (agent, line) in agents.iter().zip(&look_ahead_lines) {
            for &cell in line {
                self.board.reserve(cell, agent.id, self.tick + 2);
            }
        }

        // Read phase.
        let mut deflected_count = 0u32;
        let mut result = Vec::with_capacity(agents.len());

        for (index, ((agent, pref), line)) in agents
            .iter()
            .zip(preferred)
            .zip(&look_ahead_lines)
            .enumerate()
        {
            let mut force = Vec2::ZERO;
            let mut deflected = false;

            // 4.4.b.a: accumulate a perpendicular force per occupied
            // look-ahead cell, strength decaying with distance along the
            // ray; sign breaks on id parity.
            let perp_sign = if agent.id % 2 == 0 { 1.0 } else { -1.0 };
            let heading_perp = pref.normalize_or_zero().perp();
            for (step_index, &cell) in line.iter().enumerate() {
                let occupancy = self.board.foreign_occupancy(cell, agent.id);
                if occupancy > 0 {
                    deflected = true;
                    let falloff = 1.0
                        - (step_index as f32) / (self.config.look_ahead_cells as f32);
                    force += heading_perp
                        * (perp_sign * self.config.avoidance_strength * falloff * occupancy as f32);
                }
            }

            // 4.4.b.b: small repulsion from every occupied cell in the 3x3
            // neighborhood of the agent's current cell.
            let current = current_cells[index];
            for dcol in -1..=1 {
                for drow in -1..=1 {
                    if dcol == 0 && drow == 0 {
                        continue;
                    }
                    let neighbor = Cell::new(current.col + dcol, current.row + drow);
                    if self.board.is_foreign_occupied(neighbor, agent.id) {
                        deflected = true;
                        let away = Vec2::new(-dcol as f32, -drow as f32).normalize_or_zero();
                        force += away * (0.15 * self.config.avoidance_strength);
                    }
                }
            }

            if deflected {
                deflected_count += 1;
            }

            let corrected = (*pref + force).clamp_length(agent.max_speed);
            result.push(corrected);
        }

        self.last_stats = IndirectTickStats { deflected_count };
        result
    }

    /// Cells swept from `start` along `direction`, one per grid step, up to
    /// `count` cells. Degenerate (near-zero) directions return no cells.
    fn look_ahead_line(&self, start: Cell, direction: Vec2, count: i32) -> Vec<Cell> {
        let unit = direction.normalize_or_zero();
        if unit == Vec2::ZERO {
            return Vec::new();
        }
        (1..=count)
            .map(|step| {
                Cell::new(
                    start.col + (unit.x * step as f32).round() as i32,
                    start.row + (unit.y * step as f32).round() as i32,
                )
            })
            .collect()
    }
}
