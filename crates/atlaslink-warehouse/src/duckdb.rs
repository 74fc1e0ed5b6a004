//! `DuckDB` connection pool management.
//!
//! Every pooled connection is cloned from one root connection, so all of them
//! share a single database instance and its file lock.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ::duckdb::Connection;

struct PoolInner {
    db_path: PathBuf,
    max_idle: usize,
    root: Mutex<Connection>,
    idle: Mutex<Vec<Connection>>,
}

/// A small pool of `DuckDB` connections over one database file.
#[derive(Clone)]
pub struct DuckDbConnectionManager {
    inner: Arc<PoolInner>,
}

impl DuckDbConnectionManager {
    /// Open the database file and create a pool around it.
    ///
    /// # Arguments
    /// * `path` - Path to the `DuckDB` database file
    /// * `max_idle` - Maximum number of idle connections kept for reuse
    ///
    /// # Errors
    /// Returns an error if the database file cannot be opened or configured.
    pub fn open(path: impl Into<PathBuf>, max_idle: usize) -> Result<Self, ::duckdb::Error> {
        let db_path = path.into();
        let root = Connection::open(db_path.as_path())?;
        configure_connection(&root)?;

        Ok(Self {
            inner: Arc::new(PoolInner {
                db_path,
                max_idle: max_idle.max(1),
                root: Mutex::new(root),
                idle: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Acquire a connection from the pool, cloning a new one from the root
    /// connection when none is idle.
    ///
    /// # Errors
    /// Returns an error if a new connection cannot be created or configured.
    ///
    /// # Panics
    /// Panics if a pool mutex is poisoned.
    pub fn acquire(&self) -> Result<PooledConnection, ::duckdb::Error> {
        let reused = self
            .inner
            .idle
            .lock()
            .expect("duckdb connection pool mutex poisoned")
            .pop();

        let connection = match reused {
            Some(connection) => connection,
            None => {
                let root = self
                    .inner
                    .root
                    .lock()
                    .expect("duckdb root connection mutex poisoned");
                let connection = root.try_clone()?;
                configure_connection(&connection)?;
                connection
            }
        };

        Ok(PooledConnection {
            pool: Arc::clone(&self.inner),
            connection: Some(connection),
        })
    }

    /// Number of idle connections currently held by the pool.
    pub fn idle_len(&self) -> usize {
        self.inner
            .idle
            .lock()
            .expect("duckdb connection pool mutex poisoned")
            .len()
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        self.inner.db_path.as_path()
    }
}

/// A pooled connection that returns to the pool when dropped.
pub struct PooledConnection {
    pool: Arc<PoolInner>,
    connection: Option<Connection>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("pooled connection unexpectedly missing")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("pooled connection unexpectedly missing")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        let mut idle = self
            .pool
            .idle
            .lock()
            .expect("duckdb connection pool mutex poisoned");
        if idle.len() < self.pool.max_idle {
            idle.push(connection);
        }
    }
}

fn configure_connection(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch("PRAGMA disable_progress_bar;")
}
