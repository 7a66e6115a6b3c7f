//! Test Utilities Crate
//!
//! Provides shared test infrastructure for the connection benchmark.
//!
//! # Modules
//!
//! - `mock`: In-memory driver with connection accounting
//! - `database`: MySQL test containers for live tests
//! - `assertions`: Assertion helpers for pools and result rows
//! - `generators`: Property-based test data generators

pub mod mock;
pub mod database;
pub mod assertions;
pub mod generators;

pub use mock::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
