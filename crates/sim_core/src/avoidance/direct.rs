//! Direct (reciprocal velocity obstacle, ORCA-style) avoidance (§4.4.a).
//!
//! Agents never see each other directly; they enqueue `(position,
//! preferred_velocity)` against a single negotiator, which builds one
//! reciprocal half-plane per neighbor pair within `neighbor_dist` and solves
//! a small 2D linear program per agent for the velocity closest to its
//! preferred velocity that satisfies every induced half-plane. This
//! re-implements the published ORCA construction (ORCA half-plane per
//! neighbor, sequential half-plane-clipping LP with a worst-case-penetration
//! fallback) rather than linking a bit-compatible RVO2 library, per the
//! "Contract for implementers" note in §4.4.a.
//!
//! Every agent's half-planes this tick are built against a snapshot of the
//! *previous* tick's velocities (Jacobi-style simultaneous update), never
//! against another agent's velocity already recomputed earlier in the same
//! `step` call — the symmetry guarantee in §4.4.a only holds if both agents
//! in a pair solve against the same shared view of each other's velocity.

use std::collections::HashMap;

use crate::agent::AgentId;
use crate::math::Vec2;

use super::AgentView;

/// Tunable ORCA parameters (defaults per §4.4.a).
#[derive(Debug, Clone, Copy)]
pub struct DirectConfig {
    /// Simulation tick duration.
    pub time_step: f32,
    /// Neighbor search radius.
    pub neighbor_dist: f32,
    /// Maximum neighbors considered per agent.
    pub max_neighbors: usize,
    /// Time horizon used to build the agent-agent half-plane.
    pub time_horizon: f32,
}

impl Default for DirectConfig {
    fn default() -> Self {
        Self {
            time_step: 1.0 / 60.0,
            neighbor_dist: 50.0,
            max_neighbors: 10,
            time_horizon: 5.0,
        }
    }
}

/// A half-plane `{ v : (v - point) . normal >= 0 }` of permitted velocities.
#[derive(Debug, Clone, Copy)]
struct HalfPlane {
    point: Vec2,
    normal: Vec2,
}

impl HalfPlane {
    fn satisfies(&self, v: Vec2) -> bool {
        (v - self.point).dot(self.normal) >= -1e-5
    }
}

/// Per-tick statistics for the `Direct` strategy, additive diagnostics not
/// present in `spec.md`'s `MetricRecord` (see `SPEC_FULL.md` §3).
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectTickStats {
    /// Number of agents whose LP was infeasible this tick and fell back to
    /// the worst-case-penetration solve.
    pub lp_fallback_count: u32,
}

/// The mediator-centric ORCA negotiator.
#[derive(Debug, Clone)]
pub struct DirectStrategy {
    config: DirectConfig,
    /// Registry of each participating agent's last chosen velocity, rebuilt
    /// lazily when the set of agents changes between ticks (§4.4.a: "Rebuild
    /// policy").
    registry: HashMap<AgentId, Vec2>,
    last_stats: DirectTickStats,
}

impl Default for DirectStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectStrategy {
    /// Construct with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: DirectConfig::default(),
            registry: HashMap::new(),
            last_stats: DirectTickStats::default(),
        }
    }

    /// Statistics recorded by the most recent [`DirectStrategy::step`] call.
    #[must_use]
    pub fn last_stats(&self) -> DirectTickStats {
        self.last_stats
    }

    pub(super) fn initialize(&mut self, tick_dt: f32, _agent_radius: f32, _max_speed: f32) {
        self.config.time_step = tick_dt;
        self.registry.clear();
    }

    fn rebuild_registry(&mut self, agents: &[AgentView], preferred: &[Vec2]) {
        let current_ids: std::collections::HashSet<AgentId> =
            agents.iter().map(|a| a.id).collect();
        self.registry.retain(|id, _| current_ids.contains(id));
        for (agent, pref) in agents.iter().zip(preferred) {
            self.registry.entry(agent.id).or_insert(*pref);
        }
    }

    pub(super) fn step(&mut self, agents: &[AgentView], preferred: &[Vec2]) -> Vec<Vec2> {
        if agents.is_empty() {
            self.last_stats = DirectTickStats::default();
            return Vec::new();
        }

        self.rebuild_registry(agents, preferred);

        // Snapshot every agent's velocity before this tick's solve. ORCA's
        // symmetry guarantee (every pair's half-planes are built from the
        // same prior-tick velocities) requires a Jacobi-style simultaneous
        // update: agent B's half-planes must see agent A's velocity as it
        // was before this tick, not A's already-recomputed velocity from
        // earlier in this same loop.
        let snapshot = self.registry.clone();

        let mut fallback_count = 0u32;
        let mut result = Vec::with_capacity(agents.len());
        let mut next_registry = HashMap::with_capacity(agents.len());

        for (i, agent) in agents.iter().enumerate() {
            let own_velocity = snapshot[&agent.id];

            // Gather up to `max_neighbors` closest agents within
            // `neighbor_dist`.
            let mut neighbors: Vec<(f32, &AgentView)> = agents
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, other)| (agent.position.distance_squared(other.position), other))
                .filter(|&(dist_sq, _)| dist_sq <= self.config.neighbor_dist * self.config.neighbor_dist)
                .collect();
            neighbors.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
            neighbors.truncate(self.config.max_neighbors);

            let planes: Vec<HalfPlane> = neighbors
                .iter()
                .map(|&(_, other)| {
                    self.orca_half_plane(
                        agent.position,
                        own_velocity,
                        agent.radius,
                        other.position,
                        snapshot[&other.id],
                        other.radius,
                    )
                })
                .collect();

            let optimal = preferred[i];
            let (velocity, used_fallback) = solve_velocity(&planes, optimal, agent.max_speed);
            if used_fallback {
                fallback_count += 1;
            }

            next_registry.insert(agent.id, velocity);
            result.push(velocity);
        }

        self.registry = next_registry;
        self.last_stats = DirectTickStats {
            lp_fallback_count: fallback_count,
        };
        result
    }

    /// Build the ORCA half-plane induced on `self` by `other`, following the
    /// published construction: a cutoff-circle projection when the relative
    /// velocity already points out of the combined radius cone within
    /// `time_horizon`, otherwise a leg projection.
    fn orca_half_plane(
        &self,
        pos_a: Vec2,
        vel_a: Vec2,
        radius_a: f32,
        pos_b: Vec2,
        vel_b: Vec2,
        radius_b: f32,
    ) -> HalfPlane {
        let relative_position = pos_b - pos_a;
        let relative_velocity = vel_a - vel_b;
        let dist_sq = relative_position.length_squared();
        let combined_radius = radius_a + radius_b;
        let combined_radius_sq = combined_radius * combined_radius;

        let u;
        if dist_sq > combined_radius_sq {
            // No collision yet: project relative velocity against the
            // velocity-obstacle cone scaled by `time_horizon`.
            let w = relative_velocity - relative_position / self.config.time_horizon;
            let w_length_sq = w.length_squared();
            let dot1 = w.dot(relative_position);

            if dot1 < 0.0 && dot1 * dot1 > combined_radius_sq * w_length_sq {
                // Closest point on the cutoff circle.
                let w_length = w_length_sq.sqrt();
                let unit_w = w / w_length;
                u = unit_w * (combined_radius / self.config.time_horizon - w_length);
            } else {
                // Closest point on one of the cone's legs.
                let leg = (dist_sq - combined_radius_sq).max(0.0).sqrt();
                let cross = relative_position.x * w.y - relative_position.y * w.x;
                let direction = if cross > 0.0 {
                    Vec2::new(
                        relative_position.x * leg - relative_position.y * combined_radius,
                        relative_position.x * combined_radius + relative_position.y * leg,
                    ) / dist_sq
                } else {
                    Vec2::new(
                        -(relative_position.x * leg + relative_position.y * combined_radius),
                        -(-relative_position.x * combined_radius + relative_position.y * leg),
                    ) / dist_sq
                };
                let dot2 = relative_velocity.dot(direction);
                u = direction * dot2 - relative_velocity;
            }
        } else {
            // Already colliding: push apart urgently, using the tick
            // duration instead of the time horizon.
            let w = relative_velocity - relative_position / self.config.time_step;
            let w_length = w.length().max(1e-5);
            let unit_w = w / w_length;
            u = unit_w * (combined_radius / self.config.time_step - w_length);
        }

        HalfPlane {
            point: vel_a + u * 0.5,
            normal: u.normalize_or_zero(),
        }
    }
}

/// Solve for the velocity closest to `optimal` (clamped to `max_speed`) that
/// satisfies every half-plane in `planes`, processed in order. When a plane
/// cannot be satisfied given the previously-accepted planes, fall back to
/// the velocity (within the speed disc) with the least total penetration
/// across all planes — an approximation of ORCA's 3-D feasibility LP.
fn solve_velocity(planes: &[HalfPlane], optimal: Vec2, max_speed: f32) -> (Vec2, bool) {
    let mut result = optimal.clamp_length(max_speed);

    for (i, plane) in planes.iter().enumerate() {
        if plane.satisfies(result) {
            continue;
        }
        match solve_line(&planes[..=i], i, optimal, max_speed) {
            Some(v) => result = v,
            None => return (fallback_velocity(planes, max_speed), true),
        }
    }

    (result, false)
}

/// 1D problem: find the point on the boundary line of `planes[line_no]`,
/// clipped by every earlier plane and the speed disc, that is closest to
/// `optimal`.
fn solve_line(planes: &[HalfPlane], line_no: usize, optimal: Vec2, max_speed: f32) -> Option<Vec2> {
    let plane = planes[line_no];
    let direction = plane.normal.perp();

    // Intersect the speed disc |v| <= max_speed with the line through
    // `plane.point` along `direction`; keep the [t_min, t_max] interval.
    let (mut t_min, mut t_max) = disc_clip(plane.point, direction, max_speed)?;

    for earlier in &planes[..line_no] {
        let denom = direction.dot(earlier.normal);
        let numer = (earlier.point - plane.point).dot(earlier.normal);
        if denom.abs() < 1e-9 {
            if numer > 0.0 {
                return None;
            }
            continue;
        }
        let t = numer / denom;
        if denom > 0.0 {
            t_min = t_min.max(t);
        } else {
            t_max = t_max.min(t);
        }
        if t_min > t_max {
            return None;
        }
    }

    // Closest point on the clipped segment to `optimal`.
    let t_proj = (optimal - plane.point).dot(direction);
    let t = t_proj.clamp(t_min, t_max);
    Some(plane.point + direction * t)
}

/// Interval of `t` along `point + direction * t` that stays within the
/// `max_speed` disc, or `None` if the line misses the disc entirely.
fn disc_clip(point: Vec2, direction: Vec2, max_speed: f32) -> Option<(f32, f32)> {
    // |point + direction * t|^2 <= max_speed^2, direction is a unit vector.
    let b = point.dot(direction);
    let c = point.length_squared() - max_speed * max_speed;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    Some((-b - sqrt_d, -b + sqrt_d))
}

/// Fallback when the sequential LP is infeasible: the candidate (among the
/// speed-disc-clamped optimal and each plane's boundary projection) with the
/// least total penetration across all planes.
fn fallback_velocity(planes: &[HalfPlane], max_speed: f32) -> Vec2 {
    let mut best = Vec2::ZERO;
    let mut best_penetration = f32::MAX;

    let mut candidates = vec![Vec2::ZERO];
    for plane in planes {
        candidates.push(plane.point.clamp_length(max_speed));
    }

    for candidate in candidates {
        let candidate = candidate.clamp_length(max_speed);
        let penetration: f32 = planes
            .iter()
            .map(|p| (-(candidate - p.point).dot(p.normal)).max(0.0))
            .sum();
        if penetration < best_penetration {
            best_penetration = penetration;
            best = candidate;
        }
    }

    best
}
