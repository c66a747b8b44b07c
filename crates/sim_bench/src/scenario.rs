//! Scenario and sweep configuration (§6: "Input parameters"), following the
//! teacher's `rts_headless::scenario::Scenario::load` RON-file pattern.

use std::path::Path;

use serde::{Deserialize, Serialize};

use sim_core::grid::Topology;

use crate::error::{BenchError, Result};
use crate::method::BenchmarkMethod;

/// Grid and per-agent defaults for one scenario (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Grid topology.
    pub topology: Topology,
    /// Grid width in cells.
    pub width: i32,
    /// Grid height in cells.
    pub height: i32,
    /// World units per cell.
    pub cell_size: f32,
    /// Per-agent collision/avoidance radius.
    pub agent_radius: f32,
    /// Per-agent maximum speed.
    pub max_speed: f32,
    /// Fixed tick duration in seconds.
    pub tick_dt: f32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            topology: Topology::Rectangular,
            width: 20,
            height: 20,
            cell_size: 32.0,
            agent_radius: 8.0,
            max_speed: 2.0,
            tick_dt: 1.0 / 60.0,
        }
    }
}

impl ScenarioConfig {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BenchError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = ron::from_str(&contents)?;
        Ok(config)
    }

    /// Parse a scenario from a RON string (for embedded/fixture scenarios).
    pub fn from_ron_str(ron_text: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron_text)?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> sim_core::error::Result<()> {
        // Grid dimension/cell-size validation is enforced by `Grid::new`
        // itself; constructing it here just to surface the error early at
        // scenario load time (§7: "Configuration errors ... fail fast at
        // scenario construction").
        sim_core::grid::Grid::new(self.topology, self.width, self.height, self.cell_size)?;
        Ok(())
    }
}

/// A parameter sweep over agent counts and methods (§6: "Benchmark sweep").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Agent counts to run, one full scenario per count per method.
    pub agent_counts: Vec<u32>,
    /// Avoidance methods to compare.
    pub methods: Vec<BenchmarkMethod>,
    /// Maximum ticks per run before a timeout is declared.
    pub max_frames: u32,
    /// Wall-clock timeout per run, in seconds.
    pub timeout_s: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            agent_counts: vec![5, 10, 15, 20, 30],
            methods: BenchmarkMethod::default_sweep(),
            max_frames: 3600,
            timeout_s: 60.0,
        }
    }
}

impl SweepConfig {
    /// Load a sweep configuration from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BenchError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = ron::from_str(&contents)?;
        Ok(config)
    }

    /// Validate non-empty agent counts/method lists (§7: "empty method
    /// list" is a configuration error).
    pub(crate) fn validate(&self) -> Result<()> {
        if self.methods.is_empty() {
            return Err(BenchError::Configuration(
                sim_core::error::SimError::EmptyMethodList,
            ));
        }
        for &count in &self.agent_counts {
            if count == 0 {
                return Err(BenchError::Configuration(
                    sim_core::error::SimError::InvalidAgentCount(0),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_default_is_valid() {
        let scenario = ScenarioConfig::default();
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn sweep_default_has_every_method() {
        let sweep = SweepConfig::default();
        assert_eq!(sweep.methods.len(), 3);
        assert!(sweep.validate().is_ok());
    }

    #[test]
    fn sweep_empty_methods_rejected() {
        let mut sweep = SweepConfig::default();
        sweep.methods.clear();
        assert!(sweep.validate().is_err());
    }

    #[test]
    fn sweep_zero_agent_count_rejected() {
        let mut sweep = SweepConfig::default();
        sweep.agent_counts.push(0);
        assert!(sweep.validate().is_err());
    }

    #[test]
    fn scenario_round_trips_through_ron() {
        let scenario = ScenarioConfig::default();
        let text = ron::to_string(&scenario).unwrap();
        let parsed = ScenarioConfig::from_ron_str(&text).unwrap();
        assert_eq!(parsed.width, scenario.width);
        assert_eq!(parsed.height, scenario.height);
    }
}
