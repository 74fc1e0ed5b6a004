//! # Atlaslink Warehouse
//!
//! DuckDB-based durable state for atlaslink.
//!
//! ## Overview
//!
//! The warehouse keeps one row per rate-governed client so that admission
//! counters survive process restarts. Rows are addressed by an opaque key
//! derived by the caller; raw client addresses never reach the database.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use atlaslink_warehouse::{RateRecordRow, Warehouse};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let warehouse = Warehouse::open_default()?;
//!
//!     warehouse.upsert_rate_record(&RateRecordRow {
//!         key: "5f0c3c51-5ad6-5b1d-9c55-0d3e4f1f2a11".to_string(),
//!         count: 1,
//!         window_start: 1_700_000_000,
//!     })?;
//!
//!     let row = warehouse.load_rate_record("5f0c3c51-5ad6-5b1d-9c55-0d3e4f1f2a11")?;
//!     assert_eq!(row.map(|row| row.count), Some(1));
//!     Ok(())
//! }
//! ```
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `rate_records` | Admission counter and window start per client key |
//! | `schema_migrations` | Applied migration versions |

pub mod duckdb;
pub mod migrations;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::ToSql;
use serde::Serialize;
use thiserror::Error;

pub use duckdb::{DuckDbConnectionManager, PooledConnection};

/// Errors that can occur during warehouse operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (file system operations).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A stored row could not be mapped back into its record type.
    #[error("invalid stored data: {0}")]
    InvalidData(String),
}

/// Configuration for the warehouse database.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Root directory for atlaslink state.
    pub atlaslink_home: PathBuf,
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections kept in the pool.
    pub max_pool_size: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self::in_home(resolve_atlaslink_home())
    }
}

impl WarehouseConfig {
    /// Configuration rooted at an explicit home directory.
    pub fn in_home(atlaslink_home: impl Into<PathBuf>) -> Self {
        let atlaslink_home = atlaslink_home.into();
        let db_path = atlaslink_home.join("state").join("ratelimit.duckdb");
        Self {
            atlaslink_home,
            db_path,
            max_pool_size: 4,
        }
    }
}

/// Persisted admission state of one client key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateRecordRow {
    /// Derived storage key.
    pub key: String,
    /// Requests admitted in the current window.
    pub count: u32,
    /// Window start as unix seconds.
    pub window_start: i64,
}

/// The main warehouse interface.
#[derive(Clone)]
pub struct Warehouse {
    config: WarehouseConfig,
    manager: DuckDbConnectionManager,
}

impl Warehouse {
    /// Open a warehouse with default configuration.
    pub fn open_default() -> Result<Self, WarehouseError> {
        Self::open(WarehouseConfig::default())
    }

    /// Open a warehouse with the specified configuration.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = DuckDbConnectionManager::open(config.db_path.clone(), config.max_pool_size)?;
        let warehouse = Self { config, manager };
        warehouse.initialize()?;
        Ok(warehouse)
    }

    /// Apply pending schema migrations.
    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    /// Get the path to the database file.
    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Root directory this warehouse was opened under.
    pub fn home(&self) -> &Path {
        self.config.atlaslink_home.as_path()
    }

    /// Read the rate record stored under `key`, if any.
    pub fn load_rate_record(&self, key: &str) -> Result<Option<RateRecordRow>, WarehouseError> {
        let connection = self.manager.acquire()?;
        let row = connection.query_row(
            "SELECT count, window_start FROM rate_records WHERE key = ?",
            [key],
            |row| {
                let count: i64 = row.get(0)?;
                let window_start: i64 = row.get(1)?;
                Ok((count, window_start))
            },
        );

        let (count, window_start) = match row {
            Ok(values) => values,
            Err(::duckdb::Error::QueryReturnedNoRows) => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        let count = u32::try_from(count).map_err(|_| {
            WarehouseError::InvalidData(format!("rate record count {count} out of range"))
        })?;

        Ok(Some(RateRecordRow {
            key: key.to_string(),
            count,
            window_start,
        }))
    }

    /// Insert or overwrite the rate record for `row.key`.
    ///
    /// Values are bound as parameters; the key is never interpolated.
    pub fn upsert_rate_record(&self, row: &RateRecordRow) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        let count = i64::from(row.count);
        let params: [&dyn ToSql; 3] = [&row.key, &count, &row.window_start];
        connection.execute(
            "INSERT OR REPLACE INTO rate_records (key, count, window_start, updated_at) \
             VALUES (?, ?, ?, CURRENT_TIMESTAMP)",
            params.as_slice(),
        )?;
        Ok(())
    }

    /// Number of stored rate records.
    pub fn rate_record_count(&self) -> Result<usize, WarehouseError> {
        let connection = self.manager.acquire()?;
        let count: i64 =
            connection.query_row("SELECT COUNT(*) FROM rate_records", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

/// Resolve the atlaslink home directory from environment.
fn resolve_atlaslink_home() -> PathBuf {
    if let Some(path) = env::var_os("ATLASLINK_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".atlaslink");
    }

    PathBuf::from(".atlaslink")
}
