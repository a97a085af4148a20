use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::{StoreError, StoreResult};

struct Shared<C> {
    idle: Mutex<Vec<C>>,
    returned: Condvar,
    capacity: usize,
}

impl<C> Shared<C> {
    fn lock(&self) -> MutexGuard<'_, Vec<C>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A fixed set of connections handed out one caller at a time.
///
/// [`ConnectionPool::get`] blocks until a connection is free. The returned
/// guard puts the connection back when dropped, including during unwinding.
pub struct ConnectionPool<C> {
    shared: Arc<Shared<C>>,
}

impl<C> Clone for ConnectionPool<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C> std::fmt::Debug for ConnectionPool<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("capacity", &self.shared.capacity)
            .field("available", &self.available())
            .finish()
    }
}

impl<C> ConnectionPool<C> {
    /// Open `capacity` connections with `factory`.
    pub fn new(capacity: usize, mut factory: impl FnMut() -> StoreResult<C>) -> StoreResult<Self> {
        if capacity == 0 {
            return Err(StoreError::EmptyPool);
        }
        let idle = (0..capacity)
            .map(|_| factory())
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Self {
            shared: Arc::new(Shared {
                idle: Mutex::new(idle),
                returned: Condvar::new(),
                capacity,
            }),
        })
    }

    /// Take a connection, waiting for one to be returned if all are in use.
    pub fn get(&self) -> PooledConnection<C> {
        let mut idle = self.shared.lock();
        loop {
            if let Some(conn) = idle.pop() {
                return PooledConnection {
                    conn: Some(conn),
                    shared: Arc::clone(&self.shared),
                };
            }
            idle = self
                .shared
                .returned
                .wait(idle)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Take a connection if one is free right now.
    pub fn try_get(&self) -> Option<PooledConnection<C>> {
        let conn = self.shared.lock().pop()?;
        Some(PooledConnection {
            conn: Some(conn),
            shared: Arc::clone(&self.shared),
        })
    }

    /// Number of connections not currently handed out.
    pub fn available(&self) -> usize {
        self.shared.lock().len()
    }

    /// Total number of connections.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }
}

/// Exclusive use of one pooled connection.
pub struct PooledConnection<C> {
    conn: Option<C>,
    shared: Arc<Shared<C>>,
}

impl<C> Deref for PooledConnection<C> {
    type Target = C;

    fn deref(&self) -> &C {
        match &self.conn {
            Some(conn) => conn,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl<C> DerefMut for PooledConnection<C> {
    fn deref_mut(&mut self) -> &mut C {
        match &mut self.conn {
            Some(conn) => conn,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl<C> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.shared.lock().push(conn);
            self.shared.returned.notify_one();
        }
    }
}
