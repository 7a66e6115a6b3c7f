//! Database error types
//!
//! This module classifies failures coming out of the MySQL driver. A
//! `DatabaseError` travels as the boxed source inside `BenchError`, so
//! callers can downcast to it for the driver-level detail.

use bench_core::MissingParameter;
use thiserror::Error;

/// Errors raised by the MySQL adapter
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The driver or the server rejected the operation
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    /// A named placeholder had no value
    #[error(transparent)]
    MissingParameter(#[from] MissingParameter),

    /// A result column could not be mapped onto the row model
    #[error("Unsupported column type {type_name} at index {index}")]
    UnsupportedColumn { index: usize, type_name: String },
}

impl DatabaseError {
    /// Returns the server error code, when the server produced one
    ///
    /// # Example
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::Sql(sqlx::Error::RowNotFound);
    /// assert_eq!(error.code(), None);
    /// ```
    pub fn code(&self) -> Option<String> {
        match self {
            DatabaseError::Sql(sqlx::Error::Database(db_err)) => {
                db_err.code().map(|code| code.into_owned())
            }
            _ => None,
        }
    }

    /// Checks if this error is a transport or handshake failure
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::Sql(
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::Protocol(_)
                    | sqlx::Error::Configuration(_)
            )
        )
    }
}
