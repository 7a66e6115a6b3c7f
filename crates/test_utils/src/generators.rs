//! Property-Based Test Generators
//!
//! Provides proptest strategies for pool workloads and query parameters.

use proptest::prelude::*;

/// One step of a single-task pool workload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolOp {
    /// Take a new lease
    Acquire,
    /// Give back the lease at this position (modulo the number held)
    Release(usize),
    /// Run `select 1` on the lease at this position (modulo the number held)
    Query(usize),
}

/// Strategy for pool sizes worth exercising
pub fn pool_size_strategy() -> impl Strategy<Value = usize> {
    1usize..=6usize
}

/// Strategy for a single pool operation
pub fn pool_op_strategy() -> impl Strategy<Value = PoolOp> {
    prop_oneof![
        3 => Just(PoolOp::Acquire),
        2 => (0usize..16).prop_map(PoolOp::Release),
        1 => (0usize..16).prop_map(PoolOp::Query),
    ]
}

/// Strategy for a sequence of pool operations
pub fn pool_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<PoolOp>> {
    proptest::collection::vec(pool_op_strategy(), 1..=max_len)
}

/// Strategy for placeholder names accepted by named parameters
pub fn param_name_strategy() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,8}"
}
