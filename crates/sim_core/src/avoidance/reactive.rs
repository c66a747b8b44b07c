//! Reactive (local proximity sensing, no shared identity) avoidance (§4.4.c).
//!
//! Each agent is handed a sensor that reports only `(distance, direction)`
//! readings of other agents within `detection_radius` — no ids, no
//! velocities, no blackboard. Readings inside `critical_distance` produce a
//! stronger repulsion than the outer band; an anti-deadlock perpendicular
//! nudge (keyed to the agent's stable id, per the Open Question in §9 —
//! the `alive` slice this strategy sees shrinks as agents reach their
//! target, so a position-in-slice parity would drift the same way the
//! spec's index-in-alive-list ambiguity warns against) kicks in when an
//! agent has multiple critical readings and has stalled.
//! Design note carried from §4.4.c: this strategy admits oscillation and
//! multi-agent deadlock by construction — that is the point being measured.

use crate::math::Vec2;

use super::AgentView;

/// Tunable parameters. `detection_radius` and `critical_distance` are
/// derived per-agent from radius/speed per §4.4.c; `repulsion_strength` sets
/// the force scale and is left as a strategy-wide constant since the source
/// does not vary it per agent.
#[derive(Debug, Clone, Copy)]
pub struct ReactiveConfig {
    /// Force scale applied to both critical and outer-band readings.
    pub repulsion_strength: f32,
    /// Magnitude of the perpendicular anti-deadlock nudge, as a fraction of
    /// `max_speed`.
    pub nudge_fraction: f32,
    /// Speed fraction of `max_speed` below which an agent with >= 2
    /// critical readings is considered stalled and gets a nudge.
    pub stall_speed_fraction: f32,
}

impl Default for ReactiveConfig {
    fn default() -> Self {
        Self {
            repulsion_strength: 2.0,
            nudge_fraction: 0.3,
            stall_speed_fraction: 0.2,
        }
    }
}

/// Per-tick statistics, additive diagnostics not present in `MetricRecord`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactiveTickStats {
    /// Number of agents that had at least one critical-band reading this
    /// tick.
    pub critical_contact_count: u32,
    /// Number of agents whose anti-deadlock nudge fired this tick.
    pub nudge_count: u32,
}

/// The no-shared-identity proximity-sensing strategy.
#[derive(Debug, Clone)]
pub struct ReactiveStrategy {
    config: ReactiveConfig,
    max_speed: f32,
    last_stats: ReactiveTickStats,
}

impl Default for ReactiveStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactiveStrategy {
    /// Construct with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ReactiveConfig::default(),
            max_speed: 0.0,
            last_stats: ReactiveTickStats::default(),
        }
    }

    /// Statistics recorded by the most recent [`ReactiveStrategy::step`] call.
    #[must_use]
    pub fn last_stats(&self) -> ReactiveTickStats {
        self.last_stats
    }

    pub(super) fn initialize(&mut self, _tick_dt: f32, _agent_radius: f32, max_speed: f32) {
        self.max_speed = max_speed;
    }

    pub(super) fn step(&mut self, agents: &[AgentView], preferred: &[Vec2]) -> Vec<Vec2> {
        if agents.is_empty() {
            self.last_stats = ReactiveTickStats::default();
            return Vec::new();
        }

        let mut critical_contacts = 0u32;
        let mut nudges = 0u32;
        let mut result = Vec::with_capacity(agents.len());

        for (index, (agent, pref)) in agents.iter().zip(preferred).enumerate() {
            let detection_radius = 3.0 * agent.radius + 15.0 * agent.max_speed;
            let critical_distance = 2.5 * agent.radius;

            let mut total_force = Vec2::ZERO;
            let mut critical_readings = 0u32;

            for (other_index, other) in agents.iter().enumerate() {
                if other_index == index {
                    continue;
                }
                let offset = agent.position - other.position;
                let d = offset.length();
                if d >= detection_radius || d < 1e-4 {
                    continue;
                }
                let unit_direction = offset / d;

                let magnitude = if d < critical_distance {
                    critical_readings += 1;
                    2.0 * self.config.repulsion_strength * (1.0 - d / critical_distance)
                } else {
                    self.config.repulsion_strength * (1.0 - d / detection_radius)
                };

                // "Apply along -unit_direction (away from the detected
                // obstacle)": unit_direction already points from the other
                // agent to self, i.e. away from it, so the force is applied
                // along +unit_direction here.
                total_force += unit_direction * magnitude;
            }

            if critical_readings > 0 {
                critical_contacts += 1;
            }

            let mut corrected = *pref + total_force;

            if critical_readings >= 2 && corrected.length() < self.config.stall_speed_fraction * agent.max_speed {
                let heading = pref.normalize_or_zero();
                let perp = if heading == Vec2::ZERO {
                    Vec2::new(1.0, 0.0)
                } else {
                    heading.perp()
                };
                let sign = if agent.id % 2 == 0 { 1.0 } else { -1.0 };
                corrected += perp * (sign * self.config.nudge_fraction * agent.max_speed);
                nudges += 1;
            }

            result.push(corrected.clamp_length(agent.max_speed));
        }

        self.last_stats = ReactiveTickStats {
            critical_contact_count: critical_contacts,
            nudge_count: nudges,
        };
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(id: u32, x: f32, y: f32) -> AgentView {
        AgentView {
            id,
            position: Vec2::new(x, y),
            radius: 8.0,
            max_speed: 2.0,
        }
    }

    #[test]
    fn isolated_agent_keeps_preferred_velocity() {
        let mut strategy = ReactiveStrategy::new();
        strategy.initialize(1.0 / 60.0, 8.0, 2.0);
        let agents = [view(0, 0.0, 0.0)];
        let preferred = [Vec2::new(1.0, 0.0)];
        let out = strategy.step(&agents, &preferred);
        assert_eq!(out[0], preferred[0]);
        assert_eq!(strategy.last_stats().critical_contact_count, 0);
    }

    #[test]
    fn close_neighbor_triggers_critical_contact_and_repulsion() {
        let mut strategy = ReactiveStrategy::new();
        strategy.initialize(1.0 / 60.0, 8.0, 2.0);
        // distance 10 < critical_distance (2.5*8=20)
        let agents = [view(0, 0.0, 0.0), view(1, 10.0, 0.0)];
        let preferred = [Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0)];
        let out = strategy.step(&agents, &preferred);
        assert_eq!(strategy.last_stats().critical_contact_count, 2);
        // Agent 0 is pushed in -x (away from agent 1) relative to its +x preference.
        assert!(out[0].x < preferred[0].x);
    }

    #[test]
    fn distant_neighbor_outside_detection_radius_has_no_effect() {
        let mut strategy = ReactiveStrategy::new();
        strategy.initialize(1.0 / 60.0, 8.0, 2.0);
        let agents = [view(0, 0.0, 0.0), view(1, 1000.0, 0.0)];
        let preferred = [Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0)];
        let out = strategy.step(&agents, &preferred);
        assert_eq!(out[0], preferred[0]);
        assert_eq!(strategy.last_stats().critical_contact_count, 0);
    }

    #[test]
    fn stalled_agent_with_multiple_critical_readings_gets_a_nudge() {
        let mut strategy = ReactiveStrategy::new();
        strategy.initialize(1.0 / 60.0, 8.0, 2.0);
        // Two neighbors directly ahead and behind cancel the repulsion
        // along x, leaving the agent nearly stalled relative to its
        // preferred heading.
        let agents = [
            view(0, 0.0, 0.0),
            view(1, 10.0, 0.0),
            view(2, -10.0, 0.0),
        ];
        let preferred = [Vec2::new(0.0, 2.0), Vec2::new(0.0, 0.0), Vec2::new(0.0, 0.0)];
        let out = strategy.step(&agents, &preferred);
        assert_eq!(strategy.last_stats().critical_contact_count, 1);
        // The nudge only applies to agent 0 since only it has >= 2 critical
        // readings as the other two each only see one neighbor (agent 0)
        // but not each other (distance 20 > critical_distance 20? exactly
        // at boundary so excluded): agent 0 sees both, agents 1 and 2 do
        // not see each other.
        assert_eq!(strategy.last_stats().nudge_count, 1);
        assert!(out[0].x.abs() > 1e-3);
    }

    #[test]
    fn output_respects_max_speed() {
        let mut strategy = ReactiveStrategy::new();
        strategy.initialize(1.0 / 60.0, 8.0, 2.0);
        let agents = [view(0, 0.0, 0.0), view(1, 5.0, 0.0), view(2, -5.0, 0.0)];
        let preferred = [
            Vec2::new(2.0, 0.0),
            Vec2::new(-2.0, 0.0),
            Vec2::new(2.0, 0.0),
        ];
        let out = strategy.step(&agents, &preferred);
        for v in out {
            assert!(v.length() <= 2.0 + 1e-3);
        }
    }

    #[test]
    fn zero_max_speed_yields_zero_velocity() {
        let mut strategy = ReactiveStrategy::new();
        strategy.initialize(1.0 / 60.0, 8.0, 0.0);
        let agents = [view(0, 0.0, 0.0)];
        let preferred = [Vec2::new(0.0, 0.0)];
        let out = strategy.step(&agents, &preferred);
        assert!(out[0].length() < 1e-5);
    }
}
