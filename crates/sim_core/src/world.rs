//! The per-tick simulation loop (§4.5).
//!
//! `SimulationWorld` owns exactly one grid, one optional avoidance strategy,
//! and its agents (§9: "the rewrite should replace singletons with explicit
//! ownership: the `SimulationWorld` owns exactly one grid, one strategy, one
//! metric sink; lifetime = scenario"). The metric sink itself lives in
//! `sim_bench`; this crate only exposes the counters a sink would read.
//!
//! Lifecycle events (path blocked, agent reached, collision started) are
//! folded into typed counters plus a drainable event queue rather than a
//! callback observer, per the Observer-pattern design note in §9.

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, trace};

use crate::agent::{Agent, AgentId};
use crate::avoidance::{AgentView, AvoidanceStrategy};
use crate::grid::{Cell, Grid};
use crate::math::Vec2;
use crate::pathfinding::PathPlanner;

/// Distance (world units) within which an agent is considered to have
/// reached its current waypoint and should advance to the next one.
const WAYPOINT_ARRIVAL_RADIUS: f32 = 5.0;

/// An unordered pair of agent ids, canonicalized `(min, max)` so it can serve
/// as a `HashSet` key regardless of encounter order (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair(AgentId, AgentId);

impl CollisionPair {
    #[must_use]
    fn new(a: AgentId, b: AgentId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// One lifecycle event emitted during a tick, drained by the caller between
/// ticks rather than delivered via a callback (§9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    /// The planner returned an empty path for this agent; it is now
    /// `Blocked` until an explicit [`SimulationWorld::replan`].
    PathBlocked(AgentId),
    /// This agent's path cursor passed the end of its path.
    AgentReached(AgentId),
    /// A collision pair entered contact this tick (rising edge).
    CollisionStarted(CollisionPair),
}

/// Owns the grid, the agent roster, and (optionally) one avoidance strategy
/// for the duration of one scenario run.
pub struct SimulationWorld {
    grid: Grid,
    agents: Vec<Agent>,
    strategy: Option<AvoidanceStrategy>,
    planner: PathPlanner,
    tick_dt: f32,
    blocked: HashSet<AgentId>,
    active_collisions: HashSet<CollisionPair>,
    collision_count: u32,
    paths_blocked_total: u32,
    algo_time_total_s: f64,
    algo_tick_count: u32,
    events: Vec<SimEvent>,
}

impl SimulationWorld {
    /// Construct an empty world over `grid`, ticking at `tick_dt` seconds per
    /// step. No strategy is attached; call [`SimulationWorld::set_strategy`]
    /// before the first tick that should apply avoidance.
    #[must_use]
    pub fn new(grid: Grid, tick_dt: f32) -> Self {
        Self {
            grid,
            agents: Vec::new(),
            strategy: None,
            planner: PathPlanner::new(),
            tick_dt,
            blocked: HashSet::new(),
            active_collisions: HashSet::new(),
            collision_count: 0,
            paths_blocked_total: 0,
            algo_time_total_s: 0.0,
            algo_tick_count: 0,
            events: Vec::new(),
        }
    }

    /// Borrow the grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Current agent roster.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Attach or replace the avoidance strategy, initializing it for this
    /// scenario's `tick_dt`/radius/`max_speed`. Passing `None` reverts to
    /// uncorrected waypoint following.
    pub fn set_strategy(
        &mut self,
        strategy: Option<AvoidanceStrategy>,
        agent_radius: f32,
        max_speed: f32,
    ) {
        let mut strategy = strategy;
        if let Some(s) = &mut strategy {
            s.initialize(self.tick_dt, agent_radius, max_speed);
        }
        self.strategy = strategy;
    }

    /// Remove all agents and reset per-run counters, keeping the grid and
    /// strategy. Used between benchmark runs (§4.6: "Clear world agents,
    /// reset per-run metrics").
    pub fn reset(&mut self) {
        self.agents.clear();
        self.blocked.clear();
        self.active_collisions.clear();
        self.collision_count = 0;
        self.paths_blocked_total = 0;
        self.algo_time_total_s = 0.0;
        self.algo_tick_count = 0;
        self.events.clear();
    }

    /// Add a new agent, returning its assigned id.
    pub fn spawn_agent(&mut self, spawn: Vec2, target: Cell, radius: f32, max_speed: f32) -> AgentId {
        let id = self.agents.len() as AgentId;
        let target_center = self.grid.cell_to_world(target);
        self.agents
            .push(Agent::spawn(id, spawn, target, target_center, radius, max_speed));
        id
    }

    /// Total collisions counted so far this run (monotone non-decreasing,
    /// §8).
    #[must_use]
    pub const fn collision_count(&self) -> u32 {
        self.collision_count
    }

    /// Number of times a planning attempt returned an empty path this run.
    #[must_use]
    pub const fn paths_blocked_total(&self) -> u32 {
        self.paths_blocked_total
    }

    /// Mean wall-clock cost of the strategy-correction phase, in
    /// milliseconds, across every tick the strategy actually ran.
    #[must_use]
    pub fn avg_algo_ms(&self) -> f32 {
        if self.algo_tick_count == 0 {
            0.0
        } else {
            (self.algo_time_total_s / f64::from(self.algo_tick_count) * 1000.0) as f32
        }
    }

    /// Whether every agent has either reached its target or is no longer
    /// alive.
    #[must_use]
    pub fn all_reached(&self) -> bool {
        self.agents.iter().all(|a| !a.alive || a.reached)
    }

    /// Drain and return events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Explicitly clear the `Blocked` state for `id`, allowing the next tick
    /// to attempt re-planning (§4.5.2: "Blocked → Planning" is triggered
    /// only by an explicit re-plan call, never automatically per tick).
    pub fn replan(&mut self, id: AgentId) {
        self.blocked.remove(&id);
    }

    /// Advance the simulation by one tick of `self.tick_dt` seconds.
    pub fn tick(&mut self) {
        let alive_ids: Vec<AgentId> = self
            .agents
            .iter()
            .filter(|a| a.alive && !a.reached)
            .map(|a| a.id)
            .collect();

        if alive_ids.is_empty() {
            return;
        }

        if self.strategy.is_some() {
            let t0 = Instant::now();

            self.ensure_paths(&alive_ids);
            let preferred = self.preferred_velocities(&alive_ids);

            let views: Vec<AgentView> = alive_ids
                .iter()
                .map(|&id| {
                    let a = self.agent(id);
                    AgentView {
                        id,
                        position: a.position,
                        radius: a.radius,
                        max_speed: a.max_speed,
                    }
                })
                .collect();

            let corrected = self
                .strategy
                .as_mut()
                .expect("checked is_some above")
                .step(&views, &preferred);

            for (&id, corrected_velocity) in alive_ids.iter().zip(&corrected) {
                let delta = *corrected_velocity * self.tick_dt * 60.0;
                self.agent_mut(id).translate(delta);
            }

            self.algo_time_total_s += t0.elapsed().as_secs_f64();
            self.algo_tick_count += 1;

            self.count_collisions(&alive_ids);
        } else {
            self.ensure_paths(&alive_ids);
            let preferred = self.preferred_velocities(&alive_ids);
            for (&id, preferred_velocity) in alive_ids.iter().zip(&preferred) {
                let delta = preferred_velocity * self.tick_dt * 60.0;
                self.agent_mut(id).translate(delta);
            }
        }
    }

    fn agent(&self, id: AgentId) -> &Agent {
        &self.agents[id as usize]
    }

    fn agent_mut(&mut self, id: AgentId) -> &mut Agent {
        &mut self.agents[id as usize]
    }

    /// Plan a path for every alive agent that doesn't have one yet and isn't
    /// currently `Blocked` (§4.5: "ensure path for each alive agent").
    fn ensure_paths(&mut self, alive_ids: &[AgentId]) {
        for &id in alive_ids {
            let needs_plan = {
                let a = self.agent(id);
                !a.has_path && !self.blocked.contains(&id)
            };
            if !needs_plan {
                continue;
            }

            let (start, target) = {
                let a = self.agent(id);
                (self.grid.world_to_cell(a.position), a.target)
            };
            let (path, stats) = self.planner.find_path(&self.grid, start, target);

            if path.is_empty() {
                self.blocked.insert(id);
                self.paths_blocked_total += 1;
                self.events.push(SimEvent::PathBlocked(id));
                debug!(target: "world", agent_id = id, "path blocked");
            } else {
                trace!(
                    target: "world",
                    agent_id = id,
                    path_len = stats.path_len,
                    nodes_explored = stats.nodes_explored,
                    "path planned"
                );
                self.agent_mut(id).set_path(path);
            }
        }
    }

    /// Compute each agent's preferred velocity, advancing the waypoint
    /// cursor first when the agent is already within arrival radius of its
    /// current waypoint (§4.5). Blocked or pathless agents park in place.
    fn preferred_velocities(&mut self, alive_ids: &[AgentId]) -> Vec<Vec2> {
        let mut result = Vec::with_capacity(alive_ids.len());
        for &id in alive_ids {
            result.push(self.preferred_velocity_for(id));
        }
        result
    }

    fn preferred_velocity_for(&mut self, id: AgentId) -> Vec2 {
        loop {
            let waypoint = self.agent(id).current_waypoint();
            let Some(waypoint_cell) = waypoint else {
                return Vec2::ZERO;
            };

            let waypoint_world = self.grid.cell_to_world(waypoint_cell);
            let position = self.agent(id).position;

            if position.distance(waypoint_world) < WAYPOINT_ARRIVAL_RADIUS {
                let was_reached_before = self.agent(id).reached;
                self.agent_mut(id).advance_cursor();
                if self.agent(id).reached && !was_reached_before {
                    self.events.push(SimEvent::AgentReached(id));
                }
                if self.agent(id).reached {
                    return Vec2::ZERO;
                }
                continue;
            }

            let direction = (waypoint_world - position).normalize_or_zero();
            let max_speed = self.agent(id).max_speed;
            return direction * max_speed;
        }
    }

    /// Rising-edge collision counting (§4.5.1): compare this tick's contact
    /// set against the previous tick's, counting only pairs that newly
    /// entered contact.
    fn count_collisions(&mut self, alive_ids: &[AgentId]) {
        let mut current = HashSet::new();

        for (i, &a_id) in alive_ids.iter().enumerate() {
            for &b_id in &alive_ids[i + 1..] {
                let a = self.agent(a_id);
                let b = self.agent(b_id);
                let threshold = 2.0 * a.radius.max(b.radius);
                if a.position.distance(b.position) < threshold {
                    current.insert(CollisionPair::new(a_id, b_id));
                }
            }
        }

        for &pair in &current {
            if !self.active_collisions.contains(&pair) {
                self.collision_count += 1;
                self.events.push(SimEvent::CollisionStarted(pair));
            }
        }

        self.active_collisions = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Topology;

    fn empty_world(w: i32, h: i32, cell_size: f32, dt: f32) -> SimulationWorld {
        SimulationWorld::new(Grid::new(Topology::Rectangular, w, h, cell_size).unwrap(), dt)
    }

    #[test]
    fn reached_agent_position_is_unchanged_by_further_ticks() {
        let mut world = empty_world(20, 20, 10.0, 1.0 / 60.0);
        world.spawn_agent(Vec2::new(5.0, 5.0), Cell::new(0, 0), 4.0, 2.0);
        world.set_strategy(Some(AvoidanceStrategy::reactive()), 4.0, 2.0);
        for _ in 0..10 {
            world.tick();
        }
        assert!(world.agents()[0].reached);
        let position_after_reach = world.agents()[0].position;
        for _ in 0..10 {
            world.tick();
        }
        assert_eq!(world.agents()[0].position, position_after_reach);
    }

    #[test]
    fn unreachable_target_marks_agent_blocked_and_does_not_replan_automatically() {
        let mut grid = Grid::new(Topology::Rectangular, 10, 10, 10.0).unwrap();
        for row in 0..10 {
            grid.set_obstacle(Cell::new(5, row), true);
        }
        let mut world = SimulationWorld::new(grid, 1.0 / 60.0);
        let id = world.spawn_agent(Vec2::new(10.0, 10.0), Cell::new(9, 1), 4.0, 2.0);
        world.set_strategy(Some(AvoidanceStrategy::direct()), 4.0, 2.0);

        world.tick();
        assert_eq!(world.paths_blocked_total(), 1);

        world.tick();
        world.tick();
        // Still blocked: planning is not retried automatically.
        assert_eq!(world.paths_blocked_total(), 1);

        world.replan(id);
        world.tick();
        assert_eq!(world.paths_blocked_total(), 2);
    }

    #[test]
    fn collision_counter_is_monotone_and_counts_rising_edges_only() {
        let mut world = empty_world(20, 20, 10.0, 1.0 / 60.0);
        world.spawn_agent(Vec2::new(20.0, 100.0), Cell::new(17, 10), 8.0, 2.0);
        world.spawn_agent(Vec2::new(170.0, 100.0), Cell::new(2, 10), 8.0, 2.0);
        world.set_strategy(Some(AvoidanceStrategy::reactive()), 8.0, 2.0);

        let mut last = 0;
        for _ in 0..400 {
            world.tick();
            assert!(world.collision_count() >= last);
            last = world.collision_count();
        }
    }

    #[test]
    fn no_strategy_moves_agents_without_collision_accounting() {
        let mut world = empty_world(20, 20, 10.0, 1.0 / 60.0);
        world.spawn_agent(Vec2::new(20.0, 100.0), Cell::new(17, 10), 8.0, 2.0);
        world.spawn_agent(Vec2::new(170.0, 100.0), Cell::new(2, 10), 8.0, 2.0);
        // No strategy attached: agents should still move via plain
        // waypoint-following, but collisions are never counted.
        for _ in 0..400 {
            world.tick();
        }
        assert_eq!(world.collision_count(), 0);
        assert!(world.agents()[0].reached || world.agents()[0].distance_traveled > 0.0);
    }

    #[test]
    fn empty_world_tick_is_a_no_op() {
        let mut world = empty_world(5, 5, 10.0, 1.0 / 60.0);
        world.tick();
        assert!(world.all_reached());
    }
}
