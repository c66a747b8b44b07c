//! Result records and sinks (§6: "Output format").
//!
//! One [`MetricRecord`] per `(method, agent_count)` pair. The canonical sink
//! is a CSV stream with a fixed column order, mirroring the teacher's
//! `rts_headless::metrics` writer conventions (plain `std::io::Write`, no
//! external CSV crate — the column set is small and fixed).

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};
use crate::method::BenchmarkMethod;

/// One row of benchmark output (§6):
/// `Method,AgentCount,AvgAlgoMs,Collisions,CompletionS,AvgExtraPx`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Avoidance method used for this run.
    pub method: BenchmarkMethod,
    /// Number of agents spawned.
    pub agent_count: u32,
    /// Mean per-tick avoidance-algorithm time, in milliseconds.
    pub avg_algo_ms: f64,
    /// Total rising-edge collisions observed across the run.
    pub collisions: u32,
    /// Wall-simulation time until every agent reached its target (or the
    /// timeout), in seconds.
    pub completion_s: f64,
    /// Mean extra distance travelled beyond each agent's ideal path length,
    /// in world units ("px" in the source terminology).
    pub avg_extra_px: f64,
    /// Whether the run hit the frame/timeout cap before every agent
    /// finished (§4.6: timed-out runs still emit a record).
    pub timed_out: bool,
}

impl MetricRecord {
    /// Format one CSV data line (no trailing newline), matching the exact
    /// numeric precision shown in the spec's example:
    /// `Direct,10,0.1234,3,12.45,87.23`.
    #[must_use]
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{:.4},{},{:.2},{:.2}",
            self.method.token(),
            self.agent_count,
            self.avg_algo_ms,
            self.collisions,
            self.completion_s,
            self.avg_extra_px,
        )
    }
}

/// The fixed CSV header line.
pub const CSV_HEADER: &str = "Method,AgentCount,AvgAlgoMs,Collisions,CompletionS,AvgExtraPx";

/// A destination for completed [`MetricRecord`]s.
pub trait MetricSink {
    /// Append one record.
    fn write_record(&mut self, record: &MetricRecord) -> Result<()>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes CSV text to any [`std::io::Write`] (stdout, a file, a `Vec<u8>`).
pub struct CsvSink<W: Write> {
    writer: W,
    header_written: bool,
}

impl<W: Write> CsvSink<W> {
    /// Wrap a writer; the header line is emitted before the first record.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
        }
    }
}

impl<W: Write> MetricSink for CsvSink<W> {
    fn write_record(&mut self, record: &MetricRecord) -> Result<()> {
        if !self.header_written {
            writeln!(self.writer, "{CSV_HEADER}").map_err(BenchError::SinkWrite)?;
            self.header_written = true;
        }
        writeln!(self.writer, "{}", record.to_csv_line()).map_err(BenchError::SinkWrite)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(BenchError::SinkWrite)
    }
}

/// Collects records in memory, for sweep aggregation and tests (§4.6:
/// "the full sweep result is the full set of per-pair records, independent
/// of how they are eventually persisted").
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Records collected so far, in arrival order.
    pub records: Vec<MetricRecord>,
}

impl MetricSink for MemorySink {
    fn write_record(&mut self, record: &MetricRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MetricRecord {
        MetricRecord {
            method: BenchmarkMethod::Direct,
            agent_count: 10,
            avg_algo_ms: 0.1234,
            collisions: 3,
            completion_s: 12.45,
            avg_extra_px: 87.23,
            timed_out: false,
        }
    }

    #[test]
    fn csv_line_matches_spec_example_precision() {
        assert_eq!(sample().to_csv_line(), "Direct,10,0.1234,3,12.45,87.23");
    }

    #[test]
    fn csv_sink_emits_header_once() {
        let mut buf = Vec::new();
        {
            let mut sink = CsvSink::new(&mut buf);
            sink.write_record(&sample()).unwrap();
            sink.write_record(&sample()).unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.matches(CSV_HEADER).count(), 1);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn memory_sink_collects_records_in_order() {
        let mut sink = MemorySink::default();
        sink.write_record(&sample()).unwrap();
        let mut second = sample();
        second.agent_count = 20;
        sink.write_record(&second).unwrap();
        assert_eq!(sink.records.len(), 2);
        assert_eq!(sink.records[1].agent_count, 20);
    }
}
