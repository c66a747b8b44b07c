//! # sim_core
//!
//! Multi-agent navigation simulation core: a grid abstraction shared by
//! rectangular and hexagonal topologies, an A* path planner, agent kinematic
//! state, three structurally different collision-avoidance strategies, and
//! the `SimulationWorld` tick loop that wires them together.
//!
//! This crate contains **only** the simulation: no rendering, no CLI, no
//! parallelism, and no persistence. It consumes a [`clock::Clock`], a
//! [`clock::RandomSource`], and a [`clock::TickDriver`] as external
//! collaborators; everything else is owned.
//!
//! ## Crate structure
//!
//! - [`grid`] - cell topology, walkability, coordinate transforms
//! - [`pathfinding`] - A* search over a [`grid::Grid`]
//! - [`agent`] - per-agent kinematic and navigation state
//! - [`occupancy`] - shared reservation board used by the indirect strategy
//! - [`avoidance`] - the three coordination strategies
//! - [`world`] - the per-tick simulation loop
//! - [`clock`] - collaborator traits (clock, RNG, tick driver)
//! - [`math`] - 2D vector math
//! - [`error`] - configuration-time error type

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agent;
pub mod avoidance;
pub mod clock;
pub mod error;
pub mod grid;
pub mod math;
pub mod occupancy;
pub mod pathfinding;
pub mod world;

/// Re-export of the commonly used types.
pub mod prelude {
    pub use crate::agent::{Agent, AgentId};
    pub use crate::avoidance::{AgentView, AvoidanceStrategy};
    pub use crate::clock::{Clock, LcgRandomSource, RandomSource, SystemClock, TickDriver};
    pub use crate::error::{Result, SimError};
    pub use crate::grid::{Cell, Grid, Topology};
    pub use crate::math::Vec2;
    pub use crate::pathfinding::{Path, PathPlanner, PathQueryStats};
    pub use crate::world::{CollisionPair, SimEvent, SimulationWorld};
}
