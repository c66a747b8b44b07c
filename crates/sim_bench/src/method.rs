//! Avoidance-method tokens used across scenario configuration, the results
//! stream, and strategy construction (§6: "Method tokens are literal strings
//! `Direct`, `Indirect`, `None`").

use serde::{Deserialize, Serialize};

use sim_core::avoidance::AvoidanceStrategy;

/// One of the three coordination paradigms the benchmark sweeps over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BenchmarkMethod {
    /// Reciprocal velocity negotiation (ORCA-style).
    Direct,
    /// Shared occupancy blackboard.
    Indirect,
    /// Local proximity sensing, no shared identity.
    None,
}

impl BenchmarkMethod {
    /// Literal token used in the results stream's `Method` column and in RON
    /// sweep configuration files. The source used `Direta`/`Indireta`/
    /// `Sem_Comunicacao`; either spelling is acceptable per §6 as long as it
    /// stays stable within a run — this crate uses the English tokens.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Direct => "Direct",
            Self::Indirect => "Indirect",
            Self::None => "None",
        }
    }

    /// Build a fresh strategy instance for a grid sized `grid_width` x
    /// `grid_height` (only the `Indirect` variant needs the dimensions, to
    /// size its occupancy board).
    #[must_use]
    pub fn factory(self, grid_width: i32, grid_height: i32) -> AvoidanceStrategy {
        match self {
            Self::Direct => AvoidanceStrategy::direct(),
            Self::Indirect => AvoidanceStrategy::indirect(grid_width, grid_height),
            Self::None => AvoidanceStrategy::reactive(),
        }
    }

    /// The default sweep method list (§6): all three, in a stable order.
    #[must_use]
    pub fn default_sweep() -> Vec<Self> {
        vec![Self::Direct, Self::Indirect, Self::None]
    }
}

impl std::fmt::Display for BenchmarkMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_match_spec_literal_strings() {
        assert_eq!(BenchmarkMethod::Direct.token(), "Direct");
        assert_eq!(BenchmarkMethod::Indirect.token(), "Indirect");
        assert_eq!(BenchmarkMethod::None.token(), "None");
    }

    #[test]
    fn factory_returns_matching_variant_name() {
        assert_eq!(BenchmarkMethod::Direct.factory(20, 20).name(), "Direct");
        assert_eq!(BenchmarkMethod::Indirect.factory(20, 20).name(), "Indirect");
        assert_eq!(BenchmarkMethod::None.factory(20, 20).name(), "None");
    }

    #[test]
    fn default_sweep_has_all_three_methods() {
        assert_eq!(BenchmarkMethod::default_sweep().len(), 3);
    }
}
