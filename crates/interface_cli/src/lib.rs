//! connbench
//!
//! Measures what connection pooling buys: the same workload runs once
//! through a bounded pool and once opening a fresh connection per call,
//! and each run reports its wall-clock time.

pub mod benchmark;
pub mod cli;
pub mod modes;
pub mod tracing_setup;

pub use benchmark::{run, BenchReport, Workload, CALLS_PER_UNIT, DEFAULT_COMMAND, DEFAULT_ITERATIONS};
pub use cli::{Cli, ModeCommand};
pub use modes::{pooled, run_with_mysql, unpooled, Mode};
