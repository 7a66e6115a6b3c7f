//! Benchmark modes
//!
//! Pairs each acquisition strategy with the benchmark driver. The pooled
//! timing includes creating and closing the pool; the unpooled timing
//! covers only the calls, each of which pays its own connect and close.

use std::time::Instant;

use bench_core::{BenchResult, ConnectionParameters, Connector};
use infra_db::{MySqlConnector, Pool, PooledExecutor, UnpooledExecutor};
use tracing::{info, warn};

use crate::benchmark::{self, BenchReport, Workload};

/// Which benchmark to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Pooled,
    Unpooled,
}

/// Runs the workload through a pool of at most `max_size` connections
///
/// The pool is closed before returning, also when a call fails.
///
/// # Errors
///
/// Returns `BenchError::Configuration` if the pool cannot be created, or
/// the first error raised by the workload.
pub async fn pooled<C: Connector>(
    connector: C,
    max_size: usize,
    workload: &Workload,
) -> BenchResult<BenchReport> {
    let started = Instant::now();

    let pool = Pool::create(connector, max_size).await?;
    let executor = PooledExecutor::new(pool.clone());
    let outcome = benchmark::run(&executor, workload).await;
    pool.close().await;

    let mut report = outcome?;
    report.elapsed = started.elapsed();
    Ok(report)
}

/// Runs the workload opening and closing a connection for every call
pub async fn unpooled<C: Connector>(connector: C, workload: &Workload) -> BenchResult<BenchReport> {
    let executor = UnpooledExecutor::new(connector);
    benchmark::run(&executor, workload).await
}

/// Runs `mode` against the MySQL server described by `params`
///
/// `max_size` overrides the pool size from `params` in pooled mode and is
/// ignored in unpooled mode.
///
/// # Errors
///
/// Returns `BenchError::Configuration` for incomplete parameters, otherwise
/// whatever the chosen mode returns.
pub async fn run_with_mysql(
    mode: Mode,
    params: &ConnectionParameters,
    max_size: Option<usize>,
    workload: &Workload,
) -> BenchResult<BenchReport> {
    let connector = MySqlConnector::from_parameters(params)?;

    match mode {
        Mode::Pooled => {
            let max_size = match max_size {
                Some(size) => size,
                None => params.max_size()?,
            };
            info!(max_size, "Running pooled benchmark");
            pooled(connector, max_size, workload).await
        }
        Mode::Unpooled => {
            if max_size.is_some() {
                warn!("max_size has no effect in unpooled mode");
            }
            info!("Running unpooled benchmark");
            unpooled(connector, workload).await
        }
    }
}
