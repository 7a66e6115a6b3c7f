//! Infrastructure Database Layer
//!
//! This crate provides the connection-acquisition path of the benchmark:
//! a bounded connection pool, the two executor strategies built on top of
//! it, and a MySQL adapter implementing the driver ports with SQLx.
//!
//! # Strategies
//!
//! - **Pooled**: lease a connection from a shared [`Pool`], run the
//!   command, give the connection back
//! - **Unpooled**: open a connection, run the command, close it
//!
//! # Example
//!
//! ```rust,ignore
//! use bench_core::{ConnectionParameters, Executor};
//! use infra_db::{MySqlConnector, Pool, PooledExecutor};
//!
//! let params = ConnectionParameters::load("config.ini", "mysql")?;
//! let connector = MySqlConnector::from_parameters(&params)?;
//! let pool = Pool::create(connector, params.max_size()?).await?;
//! let executor = PooledExecutor::new(pool.clone());
//!
//! let rows = executor.query("select 1").await?;
//! pool.close().await;
//! ```

pub mod error;
pub mod executor;
pub mod mysql;
pub mod pool;

pub use error::DatabaseError;
pub use executor::{PooledExecutor, UnpooledExecutor};
pub use mysql::{MySqlConnector, MySqlSession};
pub use pool::{Lease, Pool, PoolStats, PoolStatus};
