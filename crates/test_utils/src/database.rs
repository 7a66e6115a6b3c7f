//! Database Test Utilities
//!
//! Provides a MySQL testcontainer for live tests. Tests that use it are
//! marked `#[ignore]` because they need a Docker daemon; run them with
//! `cargo test -- --ignored`.

use std::sync::Arc;

use bench_core::{BenchResult, ConnectionParameters};
use infra_db::MySqlConnector;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::mysql::Mysql;
use tokio::sync::OnceCell;

/// Account and schema created by the MySQL image
const MYSQL_USER: &str = "root";
const MYSQL_PASSWORD: &str = "";
const MYSQL_DB: &str = "test";
const MYSQL_PORT: u16 = 3306;

/// A wrapper around a MySQL test container
pub struct TestDatabase {
    _container: ContainerAsync<Mysql>,
    pub params: ConnectionParameters,
}

impl TestDatabase {
    /// Starts a new MySQL container for testing
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start
    pub async fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let container = Mysql::default().start().await?;

        let port = container.get_host_port_ipv4(MYSQL_PORT).await?;
        let host = container.get_host().await?.to_string();

        let params = [
            ("host", host),
            ("port", port.to_string()),
            ("user", MYSQL_USER.to_string()),
            ("password", MYSQL_PASSWORD.to_string()),
            ("database", MYSQL_DB.to_string()),
        ]
        .into_iter()
        .collect();

        Ok(Self {
            _container: container,
            params,
        })
    }

    /// Returns a connector for the containerised server
    pub fn connector(&self) -> BenchResult<MySqlConnector> {
        MySqlConnector::from_parameters(&self.params)
    }
}

/// Global test database for shared integration tests
static SHARED_TEST_DB: OnceCell<Arc<TestDatabase>> = OnceCell::const_new();

/// Gets or creates a shared test database instance
///
/// # Panics
///
/// Panics if the container fails to start
pub async fn get_shared_test_database() -> Arc<TestDatabase> {
    SHARED_TEST_DB
        .get_or_init(|| async {
            Arc::new(
                TestDatabase::new()
                    .await
                    .expect("Failed to create shared test database"),
            )
        })
        .await
        .clone()
}
