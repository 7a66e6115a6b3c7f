//! In-memory Database Driver
//!
//! A driver that answers `select` lists of literals without a server, and
//! counts every connection it hands out. Tests use the counters to check
//! pool bounds and cleanup on every exit path.
//!
//! Supported commands: `select <item>[, <item>...]` where each item is an
//! integer literal, a single-quoted string, `null`, or a `?` placeholder.
//! Anything else fails the way a syntax error would on a real server.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bench_core::{BoxError, Connection, Connector, Params, Row, Rows, Value};

/// Snapshot of the mock driver counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MockStats {
    /// Connections currently open
    pub open: usize,
    /// Highest number of connections open at the same time
    pub peak_open: usize,
    /// Successful connects
    pub connects: usize,
    /// Explicit closes
    pub closes: usize,
    /// Commands executed, successful or not
    pub executed: usize,
}

#[derive(Debug, Default)]
struct MockShared {
    open: AtomicUsize,
    peak_open: AtomicUsize,
    connects: AtomicUsize,
    closes: AtomicUsize,
    executed: AtomicUsize,
    next_id: AtomicUsize,
    fail_connect: AtomicBool,
    fail_close: AtomicBool,
    close_delay_ms: AtomicU64,
}

/// Connector for the in-memory driver
///
/// Clones share counters, so a test can keep one clone and hand another to
/// the pool or executor under test.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    shared: Arc<MockShared>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> MockStats {
        MockStats {
            open: self.shared.open.load(Ordering::SeqCst),
            peak_open: self.shared.peak_open.load(Ordering::SeqCst),
            connects: self.shared.connects.load(Ordering::SeqCst),
            closes: self.shared.closes.load(Ordering::SeqCst),
            executed: self.shared.executed.load(Ordering::SeqCst),
        }
    }

    /// Makes subsequent connects fail as if the server refused them
    pub fn set_fail_connect(&self, fail: bool) {
        self.shared.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent closes report an error (the connection still goes away)
    pub fn set_fail_close(&self, fail: bool) {
        self.shared.fail_close.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent closes suspend for `delay` before the connection goes away
    pub fn set_close_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.shared.close_delay_ms.store(millis, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Connection = MockConnection;

    async fn connect(&self) -> Result<MockConnection, BoxError> {
        tokio::task::yield_now().await;

        if self.shared.fail_connect.load(Ordering::SeqCst) {
            return Err("Can't connect to MySQL server (connection refused)".into());
        }

        let open = self.shared.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.peak_open.fetch_max(open, Ordering::SeqCst);
        self.shared.connects.fetch_add(1, Ordering::SeqCst);

        Ok(MockConnection {
            id: self.shared.next_id.fetch_add(1, Ordering::SeqCst),
            shared: Arc::clone(&self.shared),
        })
    }
}

/// One open in-memory session; counts as closed once dropped
#[derive(Debug)]
pub struct MockConnection {
    id: usize,
    shared: Arc<MockShared>,
}

impl MockConnection {
    /// Unique identifier, in connect order
    pub fn id(&self) -> usize {
        self.id
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn execute(&mut self, command: &str, params: &Params) -> Result<Rows, BoxError> {
        self.shared.executed.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let (sql, values) = params.bind(command)?;
        let row = evaluate_select(&sql, values.into_iter().cloned().collect())?;
        Ok(vec![row])
    }

    async fn close(self) -> Result<(), BoxError> {
        let delay = self.shared.close_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        self.shared.closes.fetch_add(1, Ordering::SeqCst);
        if self.shared.fail_close.load(Ordering::SeqCst) {
            return Err("Lost connection to MySQL server during close".into());
        }
        Ok(())
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.shared.open.fetch_sub(1, Ordering::SeqCst);
    }
}

fn evaluate_select(sql: &str, bound: Vec<Value>) -> Result<Row, BoxError> {
    let syntax_error = || -> BoxError {
        format!("You have an error in your SQL syntax near '{}'", sql).into()
    };

    let trimmed = sql.trim().trim_end_matches(';');
    let list = match trimmed.get(..7) {
        Some(head) if head.eq_ignore_ascii_case("select ") => &trimmed[7..],
        _ => return Err(syntax_error()),
    };

    let mut bound = bound.into_iter();
    list.split(',')
        .map(|item| {
            let item = item.trim();
            if item == "?" {
                return bound
                    .next()
                    .ok_or_else(|| BoxError::from("Too few parameters bound"));
            }
            if item.eq_ignore_ascii_case("null") {
                return Ok(Value::Null);
            }
            if let Some(text) = item.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
                return Ok(Value::Text(text.to_string()));
            }
            item.parse::<i64>().map(Value::Int).map_err(|_| syntax_error())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_literals() {
        let row = evaluate_select("select 1, 'a', null", Vec::new()).unwrap();
        assert_eq!(row, vec![Value::Int(1), Value::Text("a".into()), Value::Null]);
    }

    #[test]
    fn test_select_placeholders() {
        let row = evaluate_select("SELECT ?, ?", vec![Value::Int(7), Value::from("x")]).unwrap();
        assert_eq!(row, vec![Value::Int(7), Value::Text("x".into())]);
    }

    #[test]
    fn test_malformed_command_fails() {
        assert!(evaluate_select("selec 1", Vec::new()).is_err());
        assert!(evaluate_select("select one", Vec::new()).is_err());
    }

    #[tokio::test]
    async fn test_drop_counts_as_closed() {
        let connector = MockConnector::new();
        let conn = connector.connect().await.unwrap();
        assert_eq!(connector.stats().open, 1);

        drop(conn);
        assert_eq!(connector.stats().open, 0);
        assert_eq!(connector.stats().peak_open, 1);
    }
}
