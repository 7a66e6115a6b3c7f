//! Custom Test Assertions
//!
//! Assertion helpers for pools and result rows that give more meaningful
//! failure messages than bare `assert_eq!`.

use bench_core::{Connector, Rows, Value};
use infra_db::{Pool, PoolStatus};

use crate::mock::MockStats;

/// Asserts that a result is the single row `(1,)` returned by `select 1`
pub fn assert_select_one(rows: &Rows) {
    assert_eq!(
        rows,
        &vec![vec![Value::Int(1)]],
        "Expected [(1,)] from select 1, got {:?}",
        rows
    );
}

/// Asserts that a pool has finished closing and owns no connections
pub fn assert_pool_drained<C: Connector>(pool: &Pool<C>) {
    let stats = pool.stats();
    assert_eq!(pool.status(), PoolStatus::Closed, "Pool not closed: {:?}", stats);
    assert_eq!(stats.open, 0, "Pool still owns connections: {:?}", stats);
    assert_eq!(stats.in_use, 0, "Pool still has leases out: {:?}", stats);
}

/// Asserts that the mock driver has no open connections and never exceeded `limit`
pub fn assert_no_open_connections(stats: &MockStats, limit: usize) {
    assert_eq!(stats.open, 0, "Connections left open: {:?}", stats);
    assert!(
        stats.peak_open <= limit,
        "Peak open connections {} exceeded limit {}",
        stats.peak_open,
        limit
    );
}
