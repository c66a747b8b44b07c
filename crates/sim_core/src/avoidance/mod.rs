//! Per-tick avoidance strategies (§4.4).
//!
//! Three structurally different coordination paradigms share one contract:
//! given the alive agents and their preferred velocities for this tick,
//! return a corrected velocity per agent. Per the design notes (§9), this is
//! modeled as a tagged three-variant enum rather than a trait object — no
//! fourth implementation is ever expected inside the core.

mod direct;
mod indirect;
mod reactive;

pub use direct::DirectStrategy;
pub use indirect::IndirectStrategy;
pub use reactive::ReactiveStrategy;

use crate::agent::AgentId;
use crate::math::Vec2;

/// The read-only view of an agent a strategy needs: nothing about paths or
/// health, just enough kinematics to correct a velocity.
#[derive(Debug, Clone, Copy)]
pub struct AgentView {
    /// The agent's identifier (used for id-parity tie-breaks and per-agent
    /// bookkeeping).
    pub id: AgentId,
    /// Current world-space position.
    pub position: Vec2,
    /// Collision/avoidance radius.
    pub radius: f32,
    /// Maximum speed.
    pub max_speed: f32,
}

/// One of the three coordination paradigms compared by the benchmark.
#[derive(Debug, Clone)]
pub enum AvoidanceStrategy {
    /// Reciprocal velocity negotiation (ORCA-style), mediated by a single
    /// negotiator (§4.4.a).
    Direct(DirectStrategy),
    /// Shared occupancy blackboard (§4.4.b).
    Indirect(IndirectStrategy),
    /// Local proximity sensing, no shared identity (§4.4.c).
    None(ReactiveStrategy),
}

impl AvoidanceStrategy {
    /// Construct the `Direct` variant with default ORCA parameters.
    #[must_use]
    pub fn direct() -> Self {
        Self::Direct(DirectStrategy::new())
    }

    /// Construct the `Indirect` variant.
    #[must_use]
    pub fn indirect(grid_width: i32, grid_height: i32) -> Self {
        Self::Indirect(IndirectStrategy::new(grid_width, grid_height))
    }

    /// Construct the `None` (reactive proximity sensor) variant.
    #[must_use]
    pub fn reactive() -> Self {
        Self::None(ReactiveStrategy::new())
    }

    /// Token name matching §6's literal method strings.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Direct(_) => "Direct",
            Self::Indirect(_) => "Indirect",
            Self::None(_) => "None",
        }
    }

    /// Called once per scenario before the first tick.
    pub fn initialize(&mut self, tick_dt: f32, agent_radius: f32, max_speed: f32) {
        match self {
            Self::Direct(s) => s.initialize(tick_dt, agent_radius, max_speed),
            Self::Indirect(s) => s.initialize(tick_dt, agent_radius, max_speed),
            Self::None(s) => s.initialize(tick_dt, agent_radius, max_speed),
        }
    }

    /// Correct the preferred velocities of `agents` for one tick.
    ///
    /// `output.len() == agents.len() == preferred.len()` always holds,
    /// including the empty-input case (§8: "every strategy's `step` returns
    /// an empty corrected-velocity list and does not call the RNG").
    pub fn step(&mut self, agents: &[AgentView], preferred: &[Vec2]) -> Vec<Vec2> {
        debug_assert_eq!(agents.len(), preferred.len());
        match self {
            Self::Direct(s) => s.step(agents, preferred),
            Self::Indirect(s) => s.step(agents, preferred),
            Self::None(s) => s.step(agents, preferred),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_returns_empty_output_for_every_variant() {
        for mut strategy in [
            AvoidanceStrategy::direct(),
            AvoidanceStrategy::indirect(20, 20),
            AvoidanceStrategy::reactive(),
        ] {
            strategy.initialize(1.0 / 60.0, 8.0, 2.0);
            let out = strategy.step(&[], &[]);
            assert!(out.is_empty());
        }
    }
}
