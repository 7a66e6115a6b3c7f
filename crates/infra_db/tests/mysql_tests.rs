//! Live tests against a MySQL container
//!
//! Require Docker. Run with: cargo test -p infra_db -- --ignored

use bench_core::{Executor, Params, Value};
use infra_db::{DatabaseError, Pool, PooledExecutor, UnpooledExecutor};
use test_utils::{assert_pool_drained, assert_select_one, get_shared_test_database};

#[tokio::test]
#[ignore = "requires docker"]
async fn pooled_and_unpooled_agree_on_select_one() {
    let db = get_shared_test_database().await;
    let pool = Pool::create(db.connector().unwrap(), 10).await.unwrap();
    let pooled = PooledExecutor::new(pool.clone());
    let unpooled = UnpooledExecutor::new(db.connector().unwrap());

    let from_pool = pooled.query("select 1").await.unwrap();
    let fresh = unpooled.query("select 1").await.unwrap();

    assert_select_one(&from_pool);
    assert_eq!(from_pool, fresh);

    pool.close().await;
    assert_pool_drained(&pool);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn rows_decode_into_values() {
    let db = get_shared_test_database().await;
    let executor = UnpooledExecutor::new(db.connector().unwrap());

    let rows = executor
        .execute(
            "select :n, :label, null, 2.5",
            &Params::named([("n", Value::Int(7)), ("label", Value::from("seven"))]),
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0].as_i64(), Some(7));
    assert_eq!(rows[0][1].as_str(), Some("seven"));
    assert!(rows[0][2].is_null());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn writes_are_committed() {
    let db = get_shared_test_database().await;
    let pool = Pool::create(db.connector().unwrap(), 2).await.unwrap();
    let executor = PooledExecutor::new(pool.clone());

    executor
        .query("create table if not exists bench_writes (id bigint primary key)")
        .await
        .unwrap();
    executor
        .execute("insert into bench_writes (id) values (?)", &Params::positional([42i64]))
        .await
        .unwrap();

    // a separate connection sees the committed row
    let unpooled = UnpooledExecutor::new(db.connector().unwrap());
    let rows = unpooled
        .query("select count(*) from bench_writes where id = 42")
        .await
        .unwrap();
    assert_eq!(rows[0][0].as_i64(), Some(1));

    executor.query("drop table bench_writes").await.unwrap();
    pool.close().await;
}

#[tokio::test]
#[ignore = "requires docker"]
async fn malformed_command_reports_server_error() {
    let db = get_shared_test_database().await;
    let pool = Pool::create(db.connector().unwrap(), 2).await.unwrap();
    let executor = PooledExecutor::new(pool.clone());

    let err = executor.query("selec 1").await.unwrap_err();

    assert_eq!(err.command(), Some("selec 1"));
    let source = std::error::Error::source(&err)
        .and_then(|e| e.downcast_ref::<DatabaseError>())
        .expect("Expected a DatabaseError source");
    assert!(source.code().is_some());
    assert_eq!(pool.stats().in_use, 0);

    pool.close().await;
}

#[tokio::test]
#[ignore = "requires docker"]
async fn pooled_workload_stays_within_max_size() {
    let db = get_shared_test_database().await;
    let pool = Pool::create(db.connector().unwrap(), 10).await.unwrap();
    let executor = PooledExecutor::new(pool.clone());

    for _ in 0..20_000 {
        assert_select_one(&executor.query("select 1").await.unwrap());
        assert!(pool.stats().open <= 10);
    }

    pool.close().await;
    assert_pool_drained(&pool);
}
