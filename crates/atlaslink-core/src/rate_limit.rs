//! Per-client fixed-window rate governance over a durable store.
//!
//! The governor reads a record, decides, and writes it back without holding
//! any lock across the three steps. Concurrent requests from one client can
//! therefore be admitted slightly beyond the limit; this is accepted, the
//! governor deters abuse and is not an access-control boundary.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use atlaslink_warehouse::{RateRecordRow, Warehouse, WarehouseError};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::GovernorConfig;

/// Namespace for deriving storage keys from client identities.
const CLIENT_KEY_NAMESPACE: Uuid = Uuid::from_u128(0x6a1f_3c2e_9b4d_5e70_8c21_d4f6_0a9b_7e35);

/// Admission counter of one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateRecord {
    pub count: u32,
    /// Window start as unix seconds.
    pub window_start: i64,
}

impl RateRecord {
    pub const fn fresh(now: i64) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }
}

/// Stable storage address derived from a client identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn derive(client_key: &str) -> Self {
        Self(Uuid::new_v5(&CLIENT_KEY_NAMESPACE, client_key.as_bytes()).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum RateStoreError {
    #[error(transparent)]
    Warehouse(#[from] WarehouseError),
}

/// Keyed storage for rate records.
///
/// Implementations need not make load-then-save atomic.
pub trait RateStore: Send + Sync {
    fn load(&self, key: &StorageKey) -> Result<Option<RateRecord>, RateStoreError>;

    fn save(&self, key: &StorageKey, record: RateRecord) -> Result<(), RateStoreError>;
}

/// Process-local store. The lock is held only for a single load or save.
#[derive(Debug, Default)]
pub struct InMemoryRateStore {
    records: Mutex<HashMap<StorageKey, RateRecord>>,
}

impl InMemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .expect("rate store lock is not poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RateStore for InMemoryRateStore {
    fn load(&self, key: &StorageKey) -> Result<Option<RateRecord>, RateStoreError> {
        let records = self.records.lock().expect("rate store lock is not poisoned");
        Ok(records.get(key).copied())
    }

    fn save(&self, key: &StorageKey, record: RateRecord) -> Result<(), RateStoreError> {
        let mut records = self.records.lock().expect("rate store lock is not poisoned");
        records.insert(key.clone(), record);
        Ok(())
    }
}

/// Durable store on the DuckDB warehouse; survives restarts.
#[derive(Clone)]
pub struct WarehouseRateStore {
    warehouse: Warehouse,
}

impl WarehouseRateStore {
    pub fn new(warehouse: Warehouse) -> Self {
        Self { warehouse }
    }

    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }
}

impl RateStore for WarehouseRateStore {
    fn load(&self, key: &StorageKey) -> Result<Option<RateRecord>, RateStoreError> {
        let row = self.warehouse.load_rate_record(key.as_str())?;
        Ok(row.map(|row| RateRecord {
            count: row.count,
            window_start: row.window_start,
        }))
    }

    fn save(&self, key: &StorageKey, record: RateRecord) -> Result<(), RateStoreError> {
        self.warehouse.upsert_rate_record(&RateRecordRow {
            key: key.as_str().to_string(),
            count: record.count,
            window_start: record.window_start,
        })?;
        Ok(())
    }
}

/// Admission gate keyed by client identity.
#[derive(Clone)]
pub struct RateGovernor {
    config: GovernorConfig,
    store: Arc<dyn RateStore>,
    clock: Arc<dyn Clock>,
}

impl RateGovernor {
    pub fn new(config: GovernorConfig, store: Arc<dyn RateStore>) -> Self {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: GovernorConfig,
        store: Arc<dyn RateStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            clock,
        }
    }

    /// Governor over a fresh in-memory store.
    pub fn in_memory(config: GovernorConfig) -> Self {
        Self::new(config, Arc::new(InMemoryRateStore::new()))
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// How long a denied caller should wait before retrying.
    pub fn retry_after(&self) -> Duration {
        self.config.window
    }

    pub fn is_whitelisted(&self, client_key: &str) -> bool {
        self.config
            .whitelist
            .iter()
            .any(|allowed| allowed == client_key)
    }

    /// Admit or deny one request. Storage failures admit the request.
    pub fn admit(&self, client_key: &str) -> bool {
        match self.try_admit(client_key) {
            Ok(admitted) => admitted,
            Err(error) => {
                warn!(%error, "rate store unavailable, admitting request");
                true
            }
        }
    }

    /// Admit or deny one request, surfacing storage failures.
    pub fn try_admit(&self, client_key: &str) -> Result<bool, RateStoreError> {
        if self.is_whitelisted(client_key) {
            return Ok(true);
        }

        let key = StorageKey::derive(client_key);
        let now = self.clock.now_unix();
        let window = i64::try_from(self.config.window.as_secs()).unwrap_or(i64::MAX);

        let mut record = self
            .store
            .load(&key)?
            .unwrap_or_else(|| RateRecord::fresh(now));

        if now.saturating_sub(record.window_start) > window {
            record = RateRecord::fresh(now);
        }

        if record.count >= self.config.limit {
            debug!(client = client_key, count = record.count, "rate limit exceeded");
            return Ok(false);
        }

        record.count = record.count.saturating_add(1);
        self.store.save(&key, record)?;
        Ok(true)
    }
}
