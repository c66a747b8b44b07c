//! End-to-end scenarios (§8's literal-seed scenario table), driven directly
//! through `sim_core::world::SimulationWorld` rather than the benchmark
//! sweep, since each scenario pins its own spawn/target cells.

use sim_core::clock::{LcgRandomSource, RandomSource};
use sim_core::grid::{Cell, Grid, Topology};
use sim_core::world::SimulationWorld;

const CELL_SIZE: f32 = 10.0;
const RADIUS: f32 = 8.0;
const MAX_SPEED: f32 = 2.0;
const DT: f32 = 1.0 / 60.0;

fn rect_world(width: i32, height: i32) -> SimulationWorld {
    SimulationWorld::new(Grid::new(Topology::Rectangular, width, height, CELL_SIZE).unwrap(), DT)
}

fn run_until_reached_or(world: &mut SimulationWorld, max_ticks: u32) {
    for _ in 0..max_ticks {
        if world.all_reached() {
            break;
        }
        world.tick();
    }
}

fn extra_distance(world: &SimulationWorld, agent_index: usize) -> f32 {
    let agent = &world.agents()[agent_index];
    (agent.distance_traveled - agent.ideal_distance).max(0.0)
}

/// S1: head-on agents with no avoidance collide at least once but still
/// reach with small detour.
#[test]
fn s1_no_avoidance_head_on_agents_still_reach() {
    use sim_core::avoidance::AvoidanceStrategy;

    let mut world = rect_world(20, 20);
    world.spawn_agent(world.grid().cell_to_world(Cell::new(2, 10)), Cell::new(17, 10), RADIUS, MAX_SPEED);
    world.spawn_agent(world.grid().cell_to_world(Cell::new(17, 10)), Cell::new(2, 10), RADIUS, MAX_SPEED);
    world.set_strategy(Some(AvoidanceStrategy::reactive()), RADIUS, MAX_SPEED);

    run_until_reached_or(&mut world, 600);

    assert!(world.agents()[0].reached);
    assert!(world.agents()[1].reached);
    assert!(world.collision_count() >= 1);
    assert!(extra_distance(&world, 0) < 50.0);
    assert!(extra_distance(&world, 1) < 50.0);
}

/// S2: same layout with Direct (ORCA) avoidance never lets the pair collide,
/// and spends strictly more algorithm time than the no-avoidance run.
#[test]
fn s2_direct_avoidance_avoids_collision_head_on() {
    use sim_core::avoidance::AvoidanceStrategy;

    let mut none_world = rect_world(20, 20);
    none_world.spawn_agent(none_world.grid().cell_to_world(Cell::new(2, 10)), Cell::new(17, 10), RADIUS, MAX_SPEED);
    none_world.spawn_agent(none_world.grid().cell_to_world(Cell::new(17, 10)), Cell::new(2, 10), RADIUS, MAX_SPEED);
    none_world.set_strategy(Some(AvoidanceStrategy::reactive()), RADIUS, MAX_SPEED);
    run_until_reached_or(&mut none_world, 600);

    let mut direct_world = rect_world(20, 20);
    direct_world.spawn_agent(direct_world.grid().cell_to_world(Cell::new(2, 10)), Cell::new(17, 10), RADIUS, MAX_SPEED);
    direct_world.spawn_agent(direct_world.grid().cell_to_world(Cell::new(17, 10)), Cell::new(2, 10), RADIUS, MAX_SPEED);
    direct_world.set_strategy(Some(AvoidanceStrategy::direct()), RADIUS, MAX_SPEED);
    run_until_reached_or(&mut direct_world, 600);

    assert!(direct_world.agents()[0].reached);
    assert!(direct_world.agents()[1].reached);
    assert_eq!(direct_world.collision_count(), 0);
    assert!(direct_world.avg_algo_ms() > none_world.avg_algo_ms());
}

/// S3: the indirect blackboard never performs worse than the no-avoidance
/// baseline on the same head-on layout.
#[test]
fn s3_indirect_avoidance_does_not_worsen_collisions() {
    use sim_core::avoidance::AvoidanceStrategy;

    let mut none_world = rect_world(20, 20);
    none_world.spawn_agent(none_world.grid().cell_to_world(Cell::new(2, 10)), Cell::new(17, 10), RADIUS, MAX_SPEED);
    none_world.spawn_agent(none_world.grid().cell_to_world(Cell::new(17, 10)), Cell::new(2, 10), RADIUS, MAX_SPEED);
    none_world.set_strategy(Some(AvoidanceStrategy::reactive()), RADIUS, MAX_SPEED);
    run_until_reached_or(&mut none_world, 600);

    let mut indirect_world = rect_world(20, 20);
    indirect_world.spawn_agent(indirect_world.grid().cell_to_world(Cell::new(2, 10)), Cell::new(17, 10), RADIUS, MAX_SPEED);
    indirect_world.spawn_agent(indirect_world.grid().cell_to_world(Cell::new(17, 10)), Cell::new(2, 10), RADIUS, MAX_SPEED);
    indirect_world.set_strategy(Some(AvoidanceStrategy::indirect(20, 20)), RADIUS, MAX_SPEED);
    run_until_reached_or(&mut indirect_world, 600);

    assert!(indirect_world.agents()[0].reached);
    assert!(indirect_world.agents()[1].reached);
    assert!(indirect_world.collision_count() <= none_world.collision_count());
}

/// S4: a single agent must route through the one gap in a wall of
/// obstacles, under Direct avoidance.
#[test]
fn s4_single_agent_routes_through_wall_gap() {
    use sim_core::avoidance::AvoidanceStrategy;

    let mut grid = Grid::new(Topology::Rectangular, 20, 20, CELL_SIZE).unwrap();
    for row in 0..20 {
        if row != 10 {
            grid.set_obstacle(Cell::new(10, row), true);
        }
    }
    let mut world = SimulationWorld::new(grid, DT);
    world.spawn_agent(world.grid().cell_to_world(Cell::new(5, 10)), Cell::new(15, 10), RADIUS, MAX_SPEED);
    world.set_strategy(Some(AvoidanceStrategy::direct()), RADIUS, MAX_SPEED);

    run_until_reached_or(&mut world, 1200);

    assert!(world.agents()[0].reached);
    assert!(world.agents()[0].distance_traveled >= 10.0 * CELL_SIZE);
}

/// S5: on a hex grid with random agents, the uncoordinated reactive
/// strategy is cheapest per tick of the three.
#[test]
fn s5_hex_grid_reactive_is_cheapest_algorithm() {
    use sim_core::avoidance::AvoidanceStrategy;

    let seed = 20260727;
    let agent_count = 10;

    let spawn_targets = |rng: &mut LcgRandomSource| -> Vec<(Cell, Cell)> {
        (0..agent_count)
            .map(|_| {
                let spawn = Cell::new(rng.next_range(0, 20), rng.next_range(0, 20));
                let mut target = Cell::new(rng.next_range(0, 20), rng.next_range(0, 20));
                while target == spawn {
                    target = Cell::new(rng.next_range(0, 20), rng.next_range(0, 20));
                }
                (spawn, target)
            })
            .collect()
    };

    let mut rng = LcgRandomSource::new(seed);
    let placements = spawn_targets(&mut rng);

    let build_and_run = |strategy: AvoidanceStrategy| -> SimulationWorld {
        let mut world = SimulationWorld::new(Grid::new(Topology::HexPointyTopOddQ, 20, 20, CELL_SIZE).unwrap(), DT);
        for &(spawn, target) in &placements {
            world.spawn_agent(world.grid().cell_to_world(spawn), target, RADIUS, MAX_SPEED);
        }
        world.set_strategy(Some(strategy), RADIUS, MAX_SPEED);
        run_until_reached_or(&mut world, 600);
        world
    };

    let none_world = build_and_run(AvoidanceStrategy::reactive());
    let direct_world = build_and_run(AvoidanceStrategy::direct());
    let indirect_world = build_and_run(AvoidanceStrategy::indirect(20, 20));

    assert!(none_world.collision_count() > 0);
    assert!(none_world.avg_algo_ms() < direct_world.avg_algo_ms());
    assert!(none_world.avg_algo_ms() < indirect_world.avg_algo_ms());
}

/// S6: A* on an empty grid returns a monotone-staircase shortest path.
#[test]
fn s6_astar_empty_grid_returns_monotone_shortest_path() {
    use sim_core::pathfinding::PathPlanner;

    let grid = Grid::new(Topology::Rectangular, 5, 5, CELL_SIZE).unwrap();
    let planner = PathPlanner::new();
    let (path, _stats) = planner.find_path(&grid, Cell::new(0, 0), Cell::new(4, 4));

    assert_eq!(path.len(), 9);
    for window in path.windows(2) {
        let (a, b) = (window[0], window[1]);
        let dcol = (b.col - a.col).abs();
        let drow = (b.row - a.row).abs();
        assert_eq!(dcol + drow, 1, "each step must be a single orthogonal move");
        assert!(b.col >= a.col, "no backtracking in col");
        assert!(b.row >= a.row, "no backtracking in row");
    }
}
