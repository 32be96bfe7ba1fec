//! Single-slot durable cache for the current `ProductData`.
//!
//! # Design
//! The store owns exactly one optional record. `set_current` replaces it,
//! writes it through to a `KeyValueStorage` under a fixed key, then calls
//! every observer in subscription order, all on the calling thread.
//!
//! Writers are serialized by `write_lock`, so replace + persist + notify is
//! atomic relative to other writers. The slot itself sits behind an `RwLock`
//! that is only held for the swap, which means `current()` never waits on
//! storage I/O or observer callbacks.
//!
//! Persistence is best-effort. Load and write failures are logged and then
//! dropped: a failed load starts the store empty, a failed write keeps the
//! in-memory value authoritative for the session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::config::DEFAULT_STORAGE_KEY;
use crate::error::StoreError;
use crate::storage::KeyValueStorage;
use crate::types::ProductData;

type Observer = Arc<dyn Fn(&ProductData) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw value, for handing across the FFI boundary.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn from_u64(raw: u64) -> Self {
        Self(raw)
    }
}

pub struct ProductRecordStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    current: RwLock<Option<ProductData>>,
    observers: Mutex<Vec<(SubscriptionId, Observer)>>,
    next_subscription: AtomicU64,
    write_lock: Mutex<()>,
}

impl ProductRecordStore {
    /// Open the store under the default `"adData"` key, loading any
    /// previously persisted record.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let initial = match load(storage.as_ref(), &key) {
            Ok(record) => record,
            Err(e) => {
                warn!(key = %key, error = %e, "starting with an empty product record");
                None
            }
        };
        Self {
            storage,
            key,
            current: RwLock::new(initial),
            observers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
            write_lock: Mutex::new(()),
        }
    }

    /// The current record, or `None` if nothing was ever set or loaded.
    pub fn current(&self) -> Option<ProductData> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the current record, persist it and notify observers.
    ///
    /// No validation happens here; `data` is expected to be normalized by
    /// whoever produced it. Observers run on this thread and must not call
    /// `set_current` themselves.
    pub fn set_current(&self, data: ProductData) {
        let _writer = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(data.clone());

        if let Err(e) = self.persist(&data) {
            warn!(key = %self.key, error = %e, "keeping product record in memory only");
        }

        let observers: Vec<Observer> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        debug!(product = data.id(), observers = observers.len(), "product record replaced");
        for observer in observers {
            observer(&data);
        }
    }

    /// Register `callback` to be called with every new record.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ProductData) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(sub, _)| *sub != id);
        observers.len() != before
    }

    fn persist(&self, data: &ProductData) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(data)
            .map_err(|e| StoreError::PersistenceWriteFailed(e.to_string()))?;
        self.storage
            .set(&self.key, &bytes)
            .map_err(|e| StoreError::PersistenceWriteFailed(e.to_string()))
    }
}

impl std::fmt::Debug for ProductRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductRecordStore")
            .field("key", &self.key)
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

fn load(storage: &dyn KeyValueStorage, key: &str) -> Result<Option<ProductData>, StoreError> {
    let Some(bytes) = storage
        .get(key)
        .map_err(|e| StoreError::PersistenceLoadFailed(e.to_string()))?
    else {
        debug!(key, "no persisted product record");
        return Ok(None);
    };
    let record: ProductData = serde_json::from_slice(&bytes)
        .map_err(|e| StoreError::PersistenceLoadFailed(e.to_string()))?;
    debug!(key, product = record.id(), "loaded persisted product record");
    Ok(Some(record))
}
