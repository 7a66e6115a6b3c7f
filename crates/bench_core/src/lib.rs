//! Bench Core - shared types for the connection benchmark
//!
//! This crate provides the building blocks used by the pool, the executors,
//! and the benchmark driver:
//! - Connection parameters loaded from an INI section
//! - Error kinds for configuration, pool, connection, and query failures
//! - An untyped row model and query parameters
//! - Port traits implemented by database adapters and executors

pub mod config;
pub mod error;
pub mod ports;
pub mod value;

pub use config::ConnectionParameters;
pub use error::{BenchError, BenchResult, BoxError};
pub use ports::{Connection, Connector, Executor, Strategy};
pub use value::{MissingParameter, Params, Row, Rows, Value};
