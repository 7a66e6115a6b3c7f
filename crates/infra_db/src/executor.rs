//! Pooled and connect-per-call executors
//!
//! Both implement [`Executor`] and differ only in how they get a
//! connection. Cleanup (lease release or connection close) always finishes
//! before an error is returned to the caller.

use async_trait::async_trait;
use bench_core::{BenchError, BenchResult, Connection, Connector, Executor, Params, Rows, Strategy};
use tracing::{error, warn};

use crate::pool::Pool;

/// Runs each command on a connection leased from a shared pool
pub struct PooledExecutor<C: Connector> {
    pool: Pool<C>,
}

impl<C: Connector> PooledExecutor<C> {
    pub fn new(pool: Pool<C>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl<C: Connector> Executor for PooledExecutor<C> {
    async fn execute(&self, command: &str, params: &Params) -> BenchResult<Rows> {
        let mut lease = self.pool.acquire().await.map_err(|e| log_failure(command, e))?;

        let result = lease.execute(command, params).await;
        lease.release().await;

        result.map_err(|e| log_failure(command, BenchError::query(command, e)))
    }

    fn strategy(&self) -> Strategy {
        Strategy::Pooled
    }
}

/// Opens a fresh connection for every command and closes it afterwards
pub struct UnpooledExecutor<C: Connector> {
    connector: C,
}

impl<C: Connector> UnpooledExecutor<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl<C: Connector> Executor for UnpooledExecutor<C> {
    async fn execute(&self, command: &str, params: &Params) -> BenchResult<Rows> {
        // A failed connect leaves nothing behind to close.
        let mut conn = self.connector.connect().await.map_err(|e| {
            log_failure(command, BenchError::connection("Failed to open connection", e))
        })?;

        let result = conn.execute(command, params).await;
        let closed = conn.close().await;

        match (result, closed) {
            (Ok(rows), Ok(())) => Ok(rows),
            (Ok(_), Err(e)) => Err(log_failure(
                command,
                BenchError::connection("Failed to close connection", e),
            )),
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "Failed to close connection after query error");
                }
                Err(log_failure(command, BenchError::query(command, e)))
            }
        }
    }

    fn strategy(&self) -> Strategy {
        Strategy::Unpooled
    }
}

fn log_failure(command: &str, error: BenchError) -> BenchError {
    error!(command, error = %error, "Command failed");
    error
}
