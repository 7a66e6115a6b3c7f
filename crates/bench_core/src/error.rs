//! Error types shared by every layer of the benchmark
//!
//! Each variant corresponds to one failure kind a caller can act on:
//! configuration problems, use of a closed pool, failures to open a
//! connection, and failures while running a command.

use thiserror::Error;

/// Boxed source error coming from a driver or the configuration backend
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used across the benchmark crates
pub type BenchResult<T> = Result<T, BenchError>;

/// Errors that can occur while configuring, pooling, or querying
#[derive(Debug, Error)]
pub enum BenchError {
    /// Missing or malformed configuration, or a database that could not be
    /// reached while the pool was being created
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Acquisition attempted after the pool started closing
    #[error("Connection pool is closed")]
    PoolClosed,

    /// A new connection could not be established or closed cleanly
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Statement execution, row fetch, or commit failed
    #[error("Query failed for command {command:?}: {source}")]
    Query {
        command: String,
        #[source]
        source: BoxError,
    },
}

impl BenchError {
    /// Creates a Configuration error without an underlying cause
    pub fn configuration(message: impl Into<String>) -> Self {
        BenchError::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a Configuration error wrapping its cause
    pub fn configuration_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        BenchError::Configuration {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a Connection error wrapping its cause
    pub fn connection(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        BenchError::Connection {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a Query error carrying the offending command text
    pub fn query(command: impl Into<String>, source: impl Into<BoxError>) -> Self {
        BenchError::Query {
            command: command.into(),
            source: source.into(),
        }
    }

    /// Checks if this error was raised by a closed pool
    pub fn is_pool_closed(&self) -> bool {
        matches!(self, BenchError::PoolClosed)
    }

    /// Checks if this error came from running a command
    pub fn is_query_error(&self) -> bool {
        matches!(self, BenchError::Query { .. })
    }

    /// Checks if this error is a configuration problem
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, BenchError::Configuration { .. })
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(self, BenchError::Connection { .. } | BenchError::PoolClosed)
    }

    /// Returns the command text of a Query error
    pub fn command(&self) -> Option<&str> {
        match self {
            BenchError::Query { command, .. } => Some(command),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for BenchError {
    fn from(error: config::ConfigError) -> Self {
        BenchError::configuration_with(error.to_string(), error)
    }
}
