//! Benchmark harness comparing three navigation-avoidance paradigms
//! (`sim_core`'s `Direct`/`Indirect`/`None` strategies) across a sweep of
//! agent counts, emitting a fixed-column results stream (§6, §7).

pub mod benchmark;
pub mod error;
pub mod method;
pub mod metrics;
pub mod scenario;

pub use benchmark::{run_full, run_single};
pub use error::{BenchError, Result};
pub use method::BenchmarkMethod;
pub use metrics::{CsvSink, MemorySink, MetricRecord, MetricSink};
pub use scenario::{ScenarioConfig, SweepConfig};
