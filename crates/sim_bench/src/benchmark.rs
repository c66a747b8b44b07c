//! The benchmark sweep (§4.6): one tick-loop run per `(method, agent_count)`
//! pair, emitting one [`MetricRecord`] each. Independent runs are sharded
//! across a rayon pool, grounded on the teacher's
//! `rts_headless::batch::run_batch` pattern — parallelism is strictly across
//! runs, never within a tick (§5: "no parallelism is expressed in the core").

use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use sim_core::clock::{LcgRandomSource, RandomSource};
use sim_core::grid::{Cell, Grid};
use sim_core::world::SimulationWorld;

use crate::method::BenchmarkMethod;
use crate::metrics::{MemorySink, MetricRecord, MetricSink};
use crate::scenario::{ScenarioConfig, SweepConfig};

/// One fully-run `(method, agent_count)` pair, owning its own [`Grid`] and
/// [`SimulationWorld`] so runs never share mutable state across threads.
struct RunInputs {
    method: BenchmarkMethod,
    agent_count: u32,
    scenario: ScenarioConfig,
    max_frames: u32,
    timeout_s: f64,
    seed: u64,
}

/// Run every `(method, agent_count)` combination in `sweep`, writing one
/// [`MetricRecord`] to `sink` per run (§4.6, §4.7).
///
/// Runs are sharded across threads with rayon; `sink` only ever receives
/// completed records on the calling thread, in a stable `(method, count)`
/// order matching `sweep.methods` x `sweep.agent_counts` (outer x inner),
/// regardless of which thread finished first.
pub fn run_full(
    scenario: &ScenarioConfig,
    sweep: &SweepConfig,
    sink: &mut dyn MetricSink,
) -> crate::error::Result<()> {
    sweep.validate()?;

    let inputs: Vec<RunInputs> = sweep
        .methods
        .iter()
        .flat_map(|&method| {
            sweep.agent_counts.iter().map(move |&agent_count| RunInputs {
                method,
                agent_count,
                scenario: scenario.clone(),
                max_frames: sweep.max_frames,
                timeout_s: sweep.timeout_s,
                // Each (method, count) pair gets a distinct, stable seed so
                // the sweep is reproducible run-to-run even though strict
                // agent-level determinism is not a goal (§4.6).
                seed: u64::from(agent_count) * 1_000 + method as u64,
            })
        })
        .collect();

    info!("starting sweep: {} runs", inputs.len());

    let records: Vec<MetricRecord> = inputs
        .into_par_iter()
        .map(|input| run_one(&input))
        .collect();

    for record in &records {
        sink.write_record(record)?;
    }
    sink.flush()?;

    info!("sweep complete: {} records", records.len());
    Ok(())
}

/// Run a single `(method, agent_count)` pair and return its [`MetricRecord`]
/// (§4.6, steps 1-6).
fn run_one(input: &RunInputs) -> MetricRecord {
    let scenario = &input.scenario;
    let grid = Grid::new(
        scenario.topology,
        scenario.width,
        scenario.height,
        scenario.cell_size,
    )
    .expect("scenario validated before the sweep starts");

    let walkable_cells: Vec<Cell> = (0..scenario.height)
        .flat_map(|row| (0..scenario.width).map(move |col| Cell::new(col, row)))
        .filter(|&cell| grid.is_walkable(cell))
        .collect();

    let mut world = SimulationWorld::new(grid, scenario.tick_dt);
    let mut rng = LcgRandomSource::new(input.seed);

    for _ in 0..input.agent_count {
        let (spawn_cell, target_cell) = pick_distinct_cells(&walkable_cells, &mut rng);
        let spawn_world = world.grid().cell_to_world(spawn_cell);
        world.spawn_agent(spawn_world, target_cell, scenario.agent_radius, scenario.max_speed);
    }

    let strategy = input.method.factory(scenario.width, scenario.height);
    world.set_strategy(Some(strategy), scenario.agent_radius, scenario.max_speed);

    let wall_clock_start = Instant::now();
    let mut frames_run = 0u32;
    let mut timed_out = false;

    loop {
        if world.all_reached() {
            break;
        }
        if frames_run >= input.max_frames {
            timed_out = true;
            break;
        }
        if wall_clock_start.elapsed().as_secs_f64() > input.timeout_s {
            timed_out = true;
            break;
        }
        world.tick();
        frames_run += 1;
    }

    let completion_s = if timed_out {
        f64::from(input.max_frames) * f64::from(scenario.tick_dt)
    } else {
        f64::from(frames_run) * f64::from(scenario.tick_dt)
    };

    let avg_extra_px = if world.agents().is_empty() {
        0.0
    } else {
        let total_extra: f32 = world
            .agents()
            .iter()
            .map(|a| (a.distance_traveled - a.ideal_distance).max(0.0))
            .sum();
        f64::from(total_extra) / f64::from(world.agents().len() as u32)
    };

    debug!(
        method = %input.method,
        agent_count = input.agent_count,
        frames_run,
        timed_out,
        "run complete"
    );

    MetricRecord {
        method: input.method,
        agent_count: input.agent_count,
        avg_algo_ms: f64::from(world.avg_algo_ms()),
        collisions: world.collision_count(),
        completion_s,
        avg_extra_px,
        timed_out,
    }
}

/// Uniformly sample a walkable spawn/target pair with `spawn != target`
/// (§4.6, step 2). Falls back to re-sampling the target only, bounded, so a
/// single-walkable-cell grid can't loop forever.
fn pick_distinct_cells(walkable: &[Cell], rng: &mut LcgRandomSource) -> (Cell, Cell) {
    assert!(!walkable.is_empty(), "scenario grid has no walkable cells");
    let spawn = walkable[rng.next_range(0, walkable.len() as i32) as usize];
    if walkable.len() == 1 {
        return (spawn, spawn);
    }
    loop {
        let target = walkable[rng.next_range(0, walkable.len() as i32) as usize];
        if target != spawn {
            return (spawn, target);
        }
    }
}

/// Convenience wrapper used by tests and the CLI's single-run mode: run one
/// `(method, agent_count)` pair and return its record without touching a
/// sink.
pub fn run_single(scenario: &ScenarioConfig, method: BenchmarkMethod, agent_count: u32) -> MetricRecord {
    run_one(&RunInputs {
        method,
        agent_count,
        scenario: scenario.clone(),
        max_frames: 3600,
        timeout_s: 60.0,
        seed: u64::from(agent_count) * 1_000 + method as u64,
    })
}

/// Run a full sweep into an in-memory sink, for tests.
#[cfg(test)]
pub fn run_full_in_memory(scenario: &ScenarioConfig, sweep: &SweepConfig) -> crate::error::Result<Vec<MetricRecord>> {
    let mut sink = MemorySink::default();
    run_full(scenario, sweep, &mut sink)?;
    Ok(sink.records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_scenario() -> ScenarioConfig {
        ScenarioConfig {
            width: 15,
            height: 15,
            ..ScenarioConfig::default()
        }
    }

    #[test]
    fn run_single_produces_a_completed_or_timed_out_record() {
        let scenario = small_scenario();
        let record = run_single(&scenario, BenchmarkMethod::Direct, 5);
        assert_eq!(record.agent_count, 5);
        assert!(record.completion_s > 0.0);
    }

    #[test]
    fn sweep_emits_one_record_per_method_times_count() {
        let scenario = small_scenario();
        let sweep = SweepConfig {
            agent_counts: vec![3, 6],
            methods: vec![BenchmarkMethod::Direct, BenchmarkMethod::None],
            max_frames: 200,
            timeout_s: 10.0,
        };
        let records = run_full_in_memory(&scenario, &sweep).unwrap();
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn empty_method_list_is_rejected_before_any_run() {
        let scenario = small_scenario();
        let mut sweep = SweepConfig::default();
        sweep.methods.clear();
        assert!(run_full_in_memory(&scenario, &sweep).is_err());
    }

    #[test]
    fn reactive_method_runs_to_completion_on_an_empty_grid() {
        let scenario = small_scenario();
        let record = run_single(&scenario, BenchmarkMethod::None, 4);
        assert!(record.avg_extra_px >= 0.0);
    }
}
