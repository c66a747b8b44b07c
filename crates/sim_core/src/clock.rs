//! Collaborator traits the core consumes but never constructs itself (§1:
//! "the core consumes only a `Clock`, a `RandomSource`, a `TickDriver`, and a
//! `MetricSink`"). `MetricSink` lives in `sim_bench` since only the benchmark
//! harness needs to persist records; the other three live here because
//! `SimulationWorld` calls them directly.

/// Wall-clock time source, abstracted so tests and benchmarks can supply a
/// deterministic or simulated clock instead of [`std::time::Instant`].
pub trait Clock {
    /// Seconds elapsed since some fixed, implementation-defined epoch.
    fn now_seconds(&self) -> f64;
}

/// A [`Clock`] backed by [`std::time::Instant`], for production use.
#[derive(Debug)]
pub struct SystemClock {
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Construct a clock whose epoch is "now".
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Ticks-per-second driver. The core never sleeps (§5: "no suspension points
/// internal"); this only holds the fixed `dt` a caller should step with.
#[derive(Debug, Clone, Copy)]
pub struct TickDriver {
    fps: u32,
}

impl TickDriver {
    /// Construct a driver at `fps` ticks per second. `fps` must be positive;
    /// zero is clamped to 1 to keep `dt` finite.
    #[must_use]
    pub fn new(fps: u32) -> Self {
        Self { fps: fps.max(1) }
    }

    /// Fixed per-tick duration in seconds (`1.0 / fps`).
    #[must_use]
    pub fn dt(&self) -> f32 {
        1.0 / self.fps as f32
    }

    /// Configured ticks per second.
    #[must_use]
    pub const fn fps(&self) -> u32 {
        self.fps
    }
}

impl Default for TickDriver {
    fn default() -> Self {
        Self::new(60)
    }
}

/// A source of uniform randomness the benchmark uses for agent placement
/// (§4.6: "random placement is a scenario parameter, not a correctness
/// contract"). Never called by a strategy's `step` on an empty agent list
/// (§8).
pub trait RandomSource {
    /// Next value in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Next integer in `[min, max)`. Returns `min` when the range is empty.
    fn next_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max - min) as f32;
        min + (self.next_f32() * span) as i32
    }
}

/// A small seeded linear-congruential generator, grounded on the teacher's
/// `rts_headless::spawn_generator::SpawnRng`. Not cryptographically strong;
/// suitable only for scenario placement.
#[derive(Debug, Clone)]
pub struct LcgRandomSource {
    state: u64,
}

impl LcgRandomSource {
    /// Construct a generator from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5_DEEC_E66D).wrapping_add(11);
        self.state
    }
}

impl RandomSource for LcgRandomSource {
    fn next_f32(&mut self) -> f32 {
        (self.next_u64() % 10_000) as f32 / 10_000.0
    }
}
