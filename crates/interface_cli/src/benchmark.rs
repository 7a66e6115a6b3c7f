//! Benchmark driver
//!
//! Drives an [`Executor`] through a fixed workload: `iterations` units,
//! each issuing exactly two calls of the same command, one after another.

use std::time::{Duration, Instant};

use bench_core::{BenchResult, Executor, Strategy};
use serde::{Serialize, Serializer};
use tracing::info;

/// Query calls issued by one workload unit
pub const CALLS_PER_UNIT: usize = 2;

/// Units run when no iteration count is given
pub const DEFAULT_ITERATIONS: usize = 10_000;

/// Command issued when none is given
pub const DEFAULT_COMMAND: &str = "select 1";

/// What the driver runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    pub iterations: usize,
    pub command: String,
}

impl Default for Workload {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl Workload {
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            command: DEFAULT_COMMAND.to_string(),
        }
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Total number of query calls the workload issues
    pub fn total_calls(&self) -> usize {
        self.iterations * CALLS_PER_UNIT
    }
}

/// Outcome of one benchmark run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchReport {
    pub strategy: Strategy,
    pub iterations: usize,
    pub queries: usize,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl BenchReport {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Queries completed per second, or zero for an instant run
    pub fn queries_per_sec(&self) -> f64 {
        let secs = self.elapsed_secs();
        if secs > 0.0 {
            self.queries as f64 / secs
        } else {
            0.0
        }
    }

    /// The one-line console summary
    pub fn summary(&self) -> String {
        format!("{} seconds", self.elapsed_secs())
    }
}

fn serialize_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

/// Runs the workload sequentially and measures wall-clock time
///
/// Rows are discarded. The first failing call ends the run.
///
/// # Errors
///
/// Returns the executor's error for the first failing call.
pub async fn run<E>(executor: &E, workload: &Workload) -> BenchResult<BenchReport>
where
    E: Executor + ?Sized,
{
    let strategy = executor.strategy();
    info!(
        %strategy,
        iterations = workload.iterations,
        command = %workload.command,
        "Starting benchmark"
    );

    let started = Instant::now();
    for _ in 0..workload.iterations {
        run_unit(executor, &workload.command).await?;
    }
    let elapsed = started.elapsed();

    let report = BenchReport {
        strategy,
        iterations: workload.iterations,
        queries: workload.total_calls(),
        elapsed,
    };
    info!(
        %strategy,
        elapsed_secs = report.elapsed_secs(),
        queries_per_sec = report.queries_per_sec(),
        "Benchmark finished"
    );
    Ok(report)
}

async fn run_unit<E>(executor: &E, command: &str) -> BenchResult<()>
where
    E: Executor + ?Sized,
{
    for _ in 0..CALLS_PER_UNIT {
        executor.query(command).await?;
    }
    Ok(())
}
