//! Bounded connection pool
//!
//! The pool keeps at most `max_size` connections open and lends them out as
//! [`Lease`]s. Callers suspend on a fair semaphore while every connection is
//! leased, so there is no busy waiting and no caller starves while releases
//! keep happening.
//!
//! Lifecycle: `Open → Closing → Closed`. The pool is an owned handle; clone
//! it to share it and call [`Pool::close`] before shutdown.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bench_core::{BenchError, BenchResult, Connection, Connector};
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

const DEREF_ERR: &str = "(bug) lease used after its connection was released";

/// Lifecycle phase of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolStatus {
    /// Accepting acquisitions
    Open,
    /// Rejecting acquisitions, waiting for outstanding leases
    Closing,
    /// Every connection has been returned and closed
    Closed,
}

/// Point-in-time counters of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Upper bound on open connections
    pub max_size: usize,
    /// Connections currently owned by the pool: idle, leased, or being closed
    pub open: usize,
    /// Connections waiting in the idle set
    pub idle: usize,
    /// Connections currently leased out
    pub in_use: usize,
}

/// A bounded, shareable set of reusable connections
pub struct Pool<C: Connector> {
    inner: Arc<PoolInner<C>>,
}

struct PoolInner<C: Connector> {
    connector: C,
    max_size: usize,
    permits: Arc<Semaphore>,
    state: Mutex<PoolState<C::Connection>>,
    drained: Notify,
}

struct PoolState<T> {
    // LIFO: the most recently released connection is handed out first
    idle: Vec<T>,
    open: usize,
    in_use: usize,
    status: PoolStatus,
}

impl<C: Connector> Pool<C> {
    /// Creates a pool and opens its first connection
    ///
    /// # Arguments
    ///
    /// * `connector` - Opens new connections on demand
    /// * `max_size` - Maximum number of open connections
    ///
    /// # Errors
    ///
    /// Returns `BenchError::Configuration` if `max_size` is zero or the
    /// first connection cannot be opened.
    pub async fn create(connector: C, max_size: usize) -> BenchResult<Self> {
        if max_size == 0 {
            return Err(BenchError::configuration("max_size must be at least 1"));
        }

        let first = connector.connect().await.map_err(|e| {
            BenchError::configuration_with("Failed to open the initial pool connection", e)
        })?;

        info!(max_size, "Connection pool created");

        Ok(Self {
            inner: Arc::new(PoolInner {
                connector,
                max_size,
                permits: Arc::new(Semaphore::new(max_size)),
                state: Mutex::new(PoolState {
                    idle: vec![first],
                    open: 1,
                    in_use: 0,
                    status: PoolStatus::Open,
                }),
                drained: Notify::new(),
            }),
        })
    }

    /// Borrows a connection, waiting while all of them are leased
    ///
    /// An idle connection is reused when one exists; otherwise a new one is
    /// opened. Dropping the returned future before it completes leaves the
    /// pool untouched.
    ///
    /// # Errors
    ///
    /// * `BenchError::PoolClosed` once [`Pool::close`] has been called
    /// * `BenchError::Connection` if a new connection cannot be opened
    pub async fn acquire(&self) -> BenchResult<Lease<C>> {
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|_| BenchError::PoolClosed)?;

        let reused = {
            let mut state = self.inner.lock();
            if state.status != PoolStatus::Open {
                return Err(BenchError::PoolClosed);
            }
            let conn = state.idle.pop();
            if conn.is_some() {
                state.in_use += 1;
            }
            conn
        };

        let conn = match reused {
            Some(conn) => conn,
            None => self.open_leased().await?,
        };

        Ok(Lease {
            conn: Some(conn),
            pool: Arc::clone(&self.inner),
            _permit: permit,
        })
    }

    // Caller holds a permit, so opening one more cannot exceed max_size.
    async fn open_leased(&self) -> BenchResult<C::Connection> {
        let conn = self
            .inner
            .connector
            .connect()
            .await
            .map_err(|e| BenchError::connection("Failed to open pooled connection", e))?;

        {
            let mut state = self.inner.lock();
            if state.status == PoolStatus::Open {
                state.open += 1;
                state.in_use += 1;
                debug!(open = state.open, "Opened pooled connection");
                return Ok(conn);
            }
        }

        close_quietly(conn).await;
        Err(BenchError::PoolClosed)
    }

    /// Returns a leased connection to the pool
    ///
    /// Equivalent to dropping the lease, except that a connection released
    /// while the pool is closing is closed before this returns.
    pub async fn release(&self, lease: Lease<C>) {
        lease.release().await;
    }

    /// Closes the pool gracefully
    ///
    /// New and waiting acquisitions fail with `BenchError::PoolClosed` from
    /// the moment this is called. Idle connections are closed immediately;
    /// leased ones are closed as they are released. Completes once every
    /// connection has been returned and closed. Calling it again is harmless.
    pub async fn close(&self) {
        let idle = {
            let mut state = self.inner.lock();
            if state.status == PoolStatus::Open {
                state.status = PoolStatus::Closing;
                info!(open = state.open, in_use = state.in_use, "Closing connection pool");
            }
            std::mem::take(&mut state.idle)
        };
        self.inner.permits.close();

        // guards first, so a cancelled close still uncounts every idle connection
        let idle: Vec<_> = idle
            .into_iter()
            .map(|conn| (Retiring { pool: Arc::clone(&self.inner) }, conn))
            .collect();
        for (retiring, conn) in idle {
            close_quietly(conn).await;
            drop(retiring);
        }

        loop {
            let drained = self.inner.drained.notified();
            {
                let mut state = self.inner.lock();
                if state.open == 0 {
                    if state.status != PoolStatus::Closed {
                        state.status = PoolStatus::Closed;
                        info!("Connection pool closed");
                    }
                    return;
                }
            }
            drained.await;
        }
    }

    /// Current lifecycle phase
    pub fn status(&self) -> PoolStatus {
        self.inner.lock().status
    }

    /// Whether [`Pool::close`] has been called, finished or not
    pub fn is_closed(&self) -> bool {
        self.status() != PoolStatus::Open
    }

    /// Upper bound on open connections, fixed at creation
    pub fn max_size(&self) -> usize {
        self.inner.max_size
    }

    /// Snapshot of the pool counters
    pub fn stats(&self) -> PoolStats {
        let state = self.inner.lock();
        PoolStats {
            max_size: self.inner.max_size,
            open: state.open,
            idle: state.idle.len(),
            in_use: state.in_use,
        }
    }
}

impl<C: Connector> Clone for Pool<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Connector> fmt::Debug for Pool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("status", &self.status())
            .field("stats", &self.stats())
            .finish()
    }
}

impl<C: Connector> PoolInner<C> {
    fn lock(&self) -> MutexGuard<'_, PoolState<C::Connection>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes back a leased connection
    ///
    /// Returns the connection when the pool is no longer open and the
    /// caller must retire it. It still counts as open until then.
    fn check_in(&self, conn: C::Connection) -> Option<C::Connection> {
        let mut state = self.lock();
        state.in_use -= 1;
        if state.status == PoolStatus::Open {
            state.idle.push(conn);
            return None;
        }
        Some(conn)
    }

    fn forget_one(&self) {
        let mut state = self.lock();
        state.open -= 1;
        if state.open == 0 {
            self.drained.notify_waiters();
        }
    }
}

/// One connection being closed; leaves the open count when dropped
struct Retiring<C: Connector> {
    pool: Arc<PoolInner<C>>,
}

impl<C: Connector> Drop for Retiring<C> {
    fn drop(&mut self) {
        self.pool.forget_one();
    }
}

/// Closes a connection the pool owns and only then stops counting it
///
/// Cancelling this drops the connection, which still ends the session.
async fn retire<C: Connector>(pool: Arc<PoolInner<C>>, conn: C::Connection) {
    let _retiring = Retiring { pool };
    close_quietly(conn).await;
}

/// Scoped use of one pooled connection
///
/// Dereferences to the connection. The connection goes back to the pool
/// when the lease is released or dropped, whichever happens first, so every
/// exit path (early return, error, cancellation) gives it back exactly once.
pub struct Lease<C: Connector> {
    conn: Option<C::Connection>,
    pool: Arc<PoolInner<C>>,
    // Dropped after the connection is checked in, so a woken waiter finds it idle.
    _permit: OwnedSemaphorePermit,
}

impl<C: Connector> Lease<C> {
    /// Returns the connection to the pool, closing it if the pool is closing
    pub async fn release(mut self) {
        if let Some(conn) = self.conn.take() {
            if let Some(conn) = self.pool.check_in(conn) {
                retire(Arc::clone(&self.pool), conn).await;
            }
        }
    }
}

impl<C: Connector> Deref for Lease<C> {
    type Target = C::Connection;

    fn deref(&self) -> &Self::Target {
        self.conn.as_ref().expect(DEREF_ERR)
    }
}

impl<C: Connector> DerefMut for Lease<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_mut().expect(DEREF_ERR)
    }
}

impl<C: Connector> fmt::Debug for Lease<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease")
            .field("released", &self.conn.is_none())
            .finish()
    }
}

impl<C: Connector> Drop for Lease<C> {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        let Some(conn) = self.pool.check_in(conn) else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(retire(Arc::clone(&self.pool), conn));
            }
            // no runtime left to close on; dropping the connection tears it down
            Err(_) => {
                drop(conn);
                self.pool.forget_one();
            }
        }
    }
}

async fn close_quietly<T: Connection>(conn: T) {
    match conn.close().await {
        Ok(()) => debug!("Closed pooled connection"),
        Err(e) => warn!(error = %e, "Failed to close pooled connection"),
    }
}
