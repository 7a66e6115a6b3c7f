//! Driver and executor ports
//!
//! ```text
//! ┌──────────────────────────────┐
//! │       Benchmark driver       │
//! └──────────────────────────────┘
//!                │ Executor
//!       ┌────────┴─────────┐
//!       ▼                  ▼
//! ┌────────────┐    ┌──────────────┐
//! │   Pooled   │    │   Unpooled   │
//! │  executor  │    │   executor   │
//! └────────────┘    └──────────────┘
//!       │ Pool             │
//!       └────────┬─────────┘
//!                │ Connector / Connection
//!                ▼
//!       MySQL adapter, or the in-memory mock used by tests
//! ```
//!
//! `Connector` and `Connection` describe what the pool and executors need
//! from a database client. `Executor` is the single capability the driver
//! depends on; callers cannot tell the strategies apart except by latency.

use std::fmt;

use async_trait::async_trait;

use crate::error::{BenchResult, BoxError};
use crate::value::{Params, Rows};

/// One live database session
#[async_trait]
pub trait Connection: Send + 'static {
    /// Executes `command` with `params`, fetches every row, and commits
    async fn execute(&mut self, command: &str, params: &Params) -> Result<Rows, BoxError>;

    /// Closes the session; the connection cannot be used afterwards
    async fn close(self) -> Result<(), BoxError>;
}

/// Opens new sessions from a fixed set of connection parameters
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Connection: Connection;

    async fn connect(&self) -> Result<Self::Connection, BoxError>;
}

/// Which acquisition strategy backs an executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Pooled,
    Unpooled,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Pooled => f.write_str("pooled"),
            Strategy::Unpooled => f.write_str("unpooled"),
        }
    }
}

/// Runs a command and returns its rows
#[async_trait]
pub trait Executor: Send + Sync {
    /// Executes `command` with `params`
    ///
    /// # Errors
    ///
    /// * `BenchError::Query` if the command fails, after the connection has
    ///   been released or closed
    /// * `BenchError::Connection` if no connection could be opened
    /// * `BenchError::PoolClosed` if the backing pool has been closed
    async fn execute(&self, command: &str, params: &Params) -> BenchResult<Rows>;

    /// Executes `command` without parameters
    async fn query(&self, command: &str) -> BenchResult<Rows> {
        self.execute(command, &Params::None).await
    }

    fn strategy(&self) -> Strategy;
}
