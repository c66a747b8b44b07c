//! Agent kinematic and navigation state.
//!
//! `Agent` is a leaf data structure (§4.3): it never calls into the grid,
//! the planner, or a strategy. All of that orchestration lives in
//! [`crate::world::SimulationWorld`]; mutator methods here only ever touch
//! `self`. The shape (plain struct of `Option`-free fields, doc comment per
//! field, `#[must_use]` query methods) follows the teacher's
//! `rts_core::simulation::Entity`/`rts_core::components` style, simplified
//! to a flat struct instead of an ECS-style optional-component bag, since
//! every agent in this simulator always has every field (§3: no entity ever
//! lacks a path, a target, or kinematics).

use crate::grid::Cell;
use crate::math::Vec2;
use crate::pathfinding::Path;

/// Stable identifier for an agent within one [`crate::world::SimulationWorld`].
pub type AgentId = u32;

/// One navigating agent.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Stable identifier.
    pub id: AgentId,
    /// World-space spawn point.
    pub spawn: Vec2,
    /// Target cell.
    pub target: Cell,
    /// Current world-space position.
    pub position: Vec2,
    /// Straight-line distance from spawn to the target cell's center,
    /// computed once at spawn time. Used for `extra_distance`.
    pub ideal_distance: f32,
    /// Cumulative distance actually traveled.
    pub distance_traveled: f32,
    /// Collision/avoidance radius.
    pub radius: f32,
    /// Maximum speed in world units per tick-at-60fps (§4.5 notes the `*60`
    /// normalization baked into `SimulationWorld::tick`).
    pub max_speed: f32,
    /// Current planned path, if any.
    pub path: Path,
    /// Index of the next waypoint in `path`.
    pub path_cursor: usize,
    /// Whether `path` is non-empty and still being followed.
    pub has_path: bool,
    /// Whether the agent has arrived at its target and is excluded from
    /// further motion and collision accounting.
    pub reached: bool,
    /// Health; tracked but never exercised by the core (§3).
    pub health: i32,
    /// Liveness flag.
    pub alive: bool,
}

impl Agent {
    /// Spawn a new agent at `start_cell`'s world-space position, targeting
    /// `target_cell`. No path is planned yet; the world plans it lazily.
    #[must_use]
    pub fn spawn(
        id: AgentId,
        spawn: Vec2,
        target: Cell,
        target_center: Vec2,
        radius: f32,
        max_speed: f32,
    ) -> Self {
        Self {
            id,
            spawn,
            target,
            position: spawn,
            ideal_distance: spawn.distance(target_center),
            distance_traveled: 0.0,
            radius,
            max_speed,
            path: Vec::new(),
            path_cursor: 0,
            has_path: false,
            reached: false,
            health: 1,
            alive: true,
        }
    }

    /// Assign a freshly-planned path. Resets the cursor and `reached`;
    /// `has_path` becomes true only when `p` is non-empty.
    pub fn set_path(&mut self, p: Path) {
        self.has_path = !p.is_empty();
        self.path = p;
        self.path_cursor = 0;
        self.reached = false;
    }

    /// The next waypoint the agent is steering toward, if any.
    #[must_use]
    pub fn current_waypoint(&self) -> Option<Cell> {
        self.path.get(self.path_cursor).copied()
    }

    /// Advance past the current waypoint. Once the cursor passes the end of
    /// the path, `has_path` is cleared and `reached` is set.
    pub fn advance_cursor(&mut self) {
        self.path_cursor += 1;
        if self.path_cursor >= self.path.len() {
            self.has_path = false;
            self.reached = true;
        }
    }

    /// Move the agent by `delta`, accumulating the distance traveled.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
        self.distance_traveled += delta.length();
    }

    /// Distance traveled beyond the ideal straight-line distance, floored at
    /// zero.
    #[must_use]
    pub fn extra_distance(&self) -> f32 {
        (self.distance_traveled - self.ideal_distance).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_agent() -> Agent {
        Agent::spawn(0, Vec2::new(0.0, 0.0), Cell::new(5, 5), Vec2::new(50.0, 50.0), 8.0, 2.0)
    }

    #[test]
    fn set_path_with_empty_path_does_not_mark_has_path() {
        let mut agent = new_agent();
        agent.set_path(Vec::new());
        assert!(!agent.has_path);
        assert!(!agent.reached);
    }

    #[test]
    fn advance_cursor_sets_reached_past_end() {
        let mut agent = new_agent();
        agent.set_path(vec![Cell::new(0, 0), Cell::new(1, 0)]);
        assert!(agent.has_path);
        agent.advance_cursor();
        assert!(agent.has_path);
        assert!(!agent.reached);
        agent.advance_cursor();
        assert!(!agent.has_path);
        assert!(agent.reached);
    }

    #[test]
    fn translate_accumulates_distance() {
        let mut agent = new_agent();
        agent.translate(Vec2::new(3.0, 4.0));
        assert_eq!(agent.distance_traveled, 5.0);
        agent.translate(Vec2::new(3.0, 4.0));
        assert_eq!(agent.distance_traveled, 10.0);
    }

    #[test]
    fn extra_distance_never_negative() {
        let agent = new_agent();
        assert_eq!(agent.extra_distance(), 0.0);
    }
}
