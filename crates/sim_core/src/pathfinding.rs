//! A*-based path planning over any [`Grid`].
//!
//! The open-set/closed-set machinery is grounded on the teacher's
//! `rts_core::pathfinding::{AStarNode, find_path_grid}` (a `BinaryHeap` of
//! `f_score`-ordered nodes, a `came_from` map for path reconstruction). The
//! per-query cost/length bookkeeping (`PathResult::nodes_explored`) is
//! grounded on `DNA::pathfinding::PathResult` (see `DESIGN.md`). Heuristic
//! dispatch and the hex step cost come from §4.2 of the design notes, which
//! also settles the tie-break Open Question: the legacy rectangular planner
//! broke ties by insertion order and the hex planner used a different
//! ordering; here every topology ties on lowest `h` when `f` matches.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::grid::{Cell, Grid, Topology};

/// An ordered sequence of cells. Empty means "no route found". When
/// non-empty, always starts at the query's start cell and ends at the goal.
pub type Path = Vec<Cell>;

/// Timing and size statistics for one `find_path` call, recorded onto the
/// `pathfinding` tracing channel and also returned for direct inspection.
#[derive(Debug, Clone, Copy)]
pub struct PathQueryStats {
    /// Wall-clock duration of the query.
    pub duration: Duration,
    /// Length of the returned path (0 if unreachable).
    pub path_len: usize,
    /// Number of distinct cells popped from the open set.
    pub nodes_explored: usize,
}

/// Stateless A* planner. One instance can serve any number of grids; it
/// holds no per-query state between calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathPlanner;

impl PathPlanner {
    /// Create a new planner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Find a shortest path from `start` to `goal` on `grid`.
    ///
    /// Returns an empty path if `start` or `goal` is unwalkable, or if the
    /// open set is exhausted before reaching `goal` — never an error; an
    /// empty path is the caller's "blocked" signal (§4.2).
    pub fn find_path(&self, grid: &Grid, start: Cell, goal: Cell) -> (Path, PathQueryStats) {
        let t0 = Instant::now();
        let (path, nodes_explored) = self.search(grid, start, goal);
        let stats = PathQueryStats {
            duration: t0.elapsed(),
            path_len: path.len(),
            nodes_explored,
        };
        trace!(
            target: "pathfinding",
            duration_us = stats.duration.as_micros() as u64,
            path_len = stats.path_len,
            nodes_explored = stats.nodes_explored,
            "find_path"
        );
        (path, stats)
    }

    fn search(&self, grid: &Grid, start: Cell, goal: Cell) -> (Path, usize) {
        if !grid.is_walkable(start) || !grid.is_walkable(goal) {
            return (Path::new(), 0);
        }
        if start == goal {
            return (vec![start], 1);
        }

        let mut open: BinaryHeap<AStarNode> = BinaryHeap::new();
        let mut came_from: HashMap<Cell, Cell> = HashMap::new();
        let mut g_score: HashMap<Cell, i32> = HashMap::new();
        let mut nodes_explored = 0usize;

        g_score.insert(start, 0);
        open.push(AStarNode {
            cell: start,
            f: heuristic(grid.topology(), start, goal),
            h: heuristic(grid.topology(), start, goal),
        });

        while let Some(current) = open.pop() {
            nodes_explored += 1;

            if current.cell == goal {
                return (reconstruct_path(&came_from, start, goal), nodes_explored);
            }

            let current_g = *g_score.get(&current.cell).unwrap_or(&i32::MAX);

            for neighbor in grid.neighbors(current.cell) {
                let tentative_g = current_g.saturating_add(1);
                let neighbor_g = *g_score.get(&neighbor).unwrap_or(&i32::MAX);

                if tentative_g < neighbor_g {
                    came_from.insert(neighbor, current.cell);
                    g_score.insert(neighbor, tentative_g);
                    let h = heuristic(grid.topology(), neighbor, goal);
                    open.push(AStarNode {
                        cell: neighbor,
                        f: tentative_g.saturating_add(h),
                        h,
                    });
                }
            }
        }

        (Path::new(), nodes_explored)
    }
}

/// A* open-set entry. Orders as a min-heap on `f`, then `h` (lower wins) to
/// avoid "fat" expansions (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AStarNode {
    cell: Cell,
    f: i32,
    h: i32,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Manhattan distance for rectangular grids; `dx + max(0, dy - dx/2)` for
/// hex odd-q grids, which is admissible given the column-offset layout.
fn heuristic(topology: Topology, from: Cell, to: Cell) -> i32 {
    let dx = (to.col - from.col).abs();
    let dy = (to.row - from.row).abs();
    match topology {
        Topology::Rectangular => dx + dy,
        Topology::HexPointyTopOddQ => dx + 0.max(dy - dx / 2),
    }
}

fn reconstruct_path(came_from: &HashMap<Cell, Cell>, start: Cell, goal: Cell) -> Path {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = came_from[&current];
        path.push(current);
    }
    path.reverse();
    path
}

/// Reduce a path's waypoint count via line-of-sight skipping. Grounded on
/// the teacher's `rts_core::pathfinding::{smooth_path, has_line_of_sight}`.
/// `SimulationWorld` never calls this: it always walks the raw A* path so
/// the waypoint-cursor state machine in §4.5.2 matches the spec exactly.
/// This is exposed for callers (e.g. a future renderer) that just want fewer
/// points to draw.
#[must_use]
pub fn smooth_path(grid: &Grid, path: &Path) -> Path {
    if path.len() <= 2 {
        return path.clone();
    }

    let mut smoothed = Vec::with_capacity(path.len());
    smoothed.push(path[0]);

    let mut current_idx = 0;
    while current_idx < path.len() - 1 {
        let mut furthest_visible = current_idx + 1;
        for check_idx in (current_idx + 2)..path.len() {
            if has_line_of_sight(grid, path[current_idx], path[check_idx]) {
                furthest_visible = check_idx;
            }
        }
        smoothed.push(path[furthest_visible]);
        current_idx = furthest_visible;
    }

    smoothed
}

/// Bresenham-stepped line-of-sight check between two cells.
fn has_line_of_sight(grid: &Grid, start: Cell, end: Cell) -> bool {
    let (mut x, mut y) = (start.col, start.row);
    let (x1, y1) = (end.col, end.row);

    let dx = (x1 - x).abs();
    let dy = (y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        if !grid.is_walkable(Cell::new(x, y)) {
            return false;
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }

    true
}
