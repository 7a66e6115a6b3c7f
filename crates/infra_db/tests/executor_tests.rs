//! Tests for the pooled and unpooled executor strategies

use std::sync::Arc;
use std::time::Duration;

use bench_core::{Executor, Params, Strategy, Value};
use infra_db::{Pool, PooledExecutor, UnpooledExecutor};
use proptest::prelude::*;
use test_utils::{
    assert_no_open_connections, assert_pool_drained, assert_select_one, param_name_strategy,
    MockConnector,
};

const CALLS: usize = 20_000;
const MAX_SIZE: usize = 10;

mod substitutability {
    use super::*;

    #[tokio::test]
    async fn test_strategies_return_identical_rows() {
        let pool = Pool::create(MockConnector::new(), 2).await.unwrap();
        let pooled = PooledExecutor::new(pool.clone());
        let unpooled = UnpooledExecutor::new(MockConnector::new());

        let executors: [&dyn Executor; 2] = [&pooled, &unpooled];
        let mut results = Vec::new();
        for executor in executors {
            results.push(executor.query("select 1").await.unwrap());
        }

        assert_select_one(&results[0]);
        assert_eq!(results[0], results[1]);
        assert_eq!(pooled.strategy(), Strategy::Pooled);
        assert_eq!(unpooled.strategy(), Strategy::Unpooled);

        pool.close().await;
    }

    #[tokio::test]
    async fn test_parameters_reach_the_driver() {
        let pool = Pool::create(MockConnector::new(), 2).await.unwrap();
        let pooled = PooledExecutor::new(pool.clone());
        let unpooled = UnpooledExecutor::new(MockConnector::new());

        let positional = Params::positional([Value::Int(5), Value::from("five")]);
        let named = Params::named([("label", Value::from("five")), ("n", Value::Int(5))]);
        let expected = vec![vec![Value::Int(5), Value::Text("five".into())]];

        assert_eq!(pooled.execute("select ?, ?", &positional).await.unwrap(), expected);
        assert_eq!(unpooled.execute("select :n, :label", &named).await.unwrap(), expected);

        pool.close().await;
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn test_pooled_query_failure_releases_lease() {
        let pool = Pool::create(MockConnector::new(), 3).await.unwrap();
        let executor = PooledExecutor::new(pool.clone());
        let before = pool.stats();

        let err = executor.query("selec 1").await.unwrap_err();

        assert!(err.is_query_error());
        assert_eq!(err.command(), Some("selec 1"));
        assert_eq!(pool.stats().in_use, before.in_use);
        assert_eq!(pool.stats().idle, before.idle);

        pool.close().await;
        assert_pool_drained(&pool);
    }

    #[tokio::test]
    async fn test_missing_named_parameter_is_query_error() {
        let pool = Pool::create(MockConnector::new(), 1).await.unwrap();
        let executor = PooledExecutor::new(pool.clone());

        let err = executor
            .execute("select :id", &Params::named([("other", 1)]))
            .await
            .unwrap_err();

        assert!(err.is_query_error());
        assert_eq!(pool.stats().in_use, 0);
    }

    #[tokio::test]
    async fn test_unpooled_query_failure_closes_connection() {
        let connector = MockConnector::new();
        let executor = UnpooledExecutor::new(connector.clone());

        let err = executor.query("not sql at all").await.unwrap_err();

        assert!(err.is_query_error());
        let stats = connector.stats();
        assert_eq!(stats.open, 0);
        assert_eq!(stats.connects, 1);
        assert_eq!(stats.closes, 1);
    }

    #[tokio::test]
    async fn test_unpooled_connect_failure_skips_cleanup() {
        let connector = MockConnector::new();
        connector.set_fail_connect(true);
        let executor = UnpooledExecutor::new(connector.clone());

        let err = executor.query("select 1").await.unwrap_err();

        assert!(err.is_connection_error());
        assert_eq!(connector.stats().closes, 0);
        assert_eq!(connector.stats().executed, 0);
    }

    #[tokio::test]
    async fn test_unpooled_close_failure_is_surfaced() {
        let connector = MockConnector::new();
        connector.set_fail_close(true);
        let executor = UnpooledExecutor::new(connector.clone());

        let err = executor.query("select 1").await.unwrap_err();

        assert!(err.is_connection_error());
        assert_eq!(connector.stats().open, 0);
    }

    #[tokio::test]
    async fn test_pooled_executor_after_close_fails() {
        let pool = Pool::create(MockConnector::new(), 1).await.unwrap();
        let executor = PooledExecutor::new(pool.clone());
        pool.close().await;

        let err = executor.query("select 1").await.unwrap_err();

        assert!(err.is_pool_closed());
    }

    #[tokio::test]
    async fn test_cancelled_query_returns_lease() {
        let pool = Pool::create(MockConnector::new(), 1).await.unwrap();
        let executor = PooledExecutor::new(pool.clone());

        // the mock suspends once mid-query, so a zero timeout cancels it there
        let cancelled = tokio::time::timeout(Duration::ZERO, executor.query("select 1")).await;
        assert!(cancelled.is_err());

        let stats = pool.stats();
        assert_eq!(stats.in_use, 0);
        assert_eq!(stats.idle, 1);
        assert_select_one(&executor.query("select 1").await.unwrap());
    }
}

mod workloads {
    use super::*;

    #[tokio::test]
    async fn test_pooled_twenty_thousand_calls_stay_bounded() {
        let connector = MockConnector::new();
        let pool = Pool::create(connector.clone(), MAX_SIZE).await.unwrap();
        let executor = PooledExecutor::new(pool.clone());

        for _ in 0..CALLS {
            assert_select_one(&executor.query("select 1").await.unwrap());
        }

        assert!(pool.stats().open <= MAX_SIZE);
        pool.close().await;

        assert_pool_drained(&pool);
        assert_no_open_connections(&connector.stats(), MAX_SIZE);
        assert_eq!(connector.stats().executed, CALLS);
    }

    #[tokio::test]
    async fn test_unpooled_twenty_thousand_calls_close_every_connection() {
        let connector = MockConnector::new();
        let executor = UnpooledExecutor::new(connector.clone());

        for _ in 0..CALLS {
            assert_select_one(&executor.query("select 1").await.unwrap());
            assert_eq!(connector.stats().open, 0);
        }

        let stats = connector.stats();
        assert_eq!(stats.connects, CALLS);
        assert_eq!(stats.closes, CALLS);
        assert_eq!(stats.peak_open, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_a_bounded_pool() {
        let connector = MockConnector::new();
        let pool = Pool::create(connector.clone(), MAX_SIZE).await.unwrap();
        let executor = Arc::new(PooledExecutor::new(pool.clone()));

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let executor = Arc::clone(&executor);
                tokio::spawn(async move {
                    for _ in 0..200 {
                        assert_select_one(&executor.query("select 1").await.unwrap());
                    }
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }
        pool.close().await;

        assert_pool_drained(&pool);
        assert_no_open_connections(&connector.stats(), MAX_SIZE);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn named_parameters_bind_by_name(name in param_name_strategy(), value in any::<i64>()) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let executor = UnpooledExecutor::new(MockConnector::new());
            let command = format!("select :{}, :{}", name, name);

            let rows = executor
                .execute(&command, &Params::named([(name.as_str(), Value::Int(value))]))
                .await
                .unwrap();

            assert_eq!(rows, vec![vec![Value::Int(value), Value::Int(value)]]);
        });
    }
}
