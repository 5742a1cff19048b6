//! Typed, best-effort access to persisted cart state.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::{KeyValueStore, CART_KEY, SAVED_ITEMS_KEY};
use crate::cart::{CartItem, SavedItem};
use crate::error::CartError;

/// Full cart state captured after a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Monotonic mutation counter; newer snapshots have larger versions.
    pub version: u64,
    /// Cart items.
    pub cart: Vec<CartItem>,
    /// Saved items.
    pub saved: Vec<SavedItem>,
}

/// Reads and writes the `cart` and `savedItems` keys.
///
/// Reads never fail: missing or unreadable data loads as an empty list.
/// Writes are version-guarded, so a snapshot that finishes after a newer one
/// was committed is dropped instead of overwriting it.
#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn KeyValueStore>,
    committed: Arc<Mutex<u64>>,
}

impl PersistenceGateway {
    /// Wrap a backend.
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self::from_arc(Arc::new(store))
    }

    /// Wrap a shared backend.
    pub fn from_arc(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            committed: Arc::new(Mutex::new(0)),
        }
    }

    /// Load persisted cart items.
    pub async fn load_cart(&self) -> Vec<CartItem> {
        self.load_items(CART_KEY).await
    }

    /// Load persisted saved items.
    pub async fn load_saved(&self) -> Vec<SavedItem> {
        self.load_items(SAVED_ITEMS_KEY).await
    }

    /// Version of the newest snapshot written so far.
    pub async fn committed_version(&self) -> u64 {
        *self.committed.lock().await
    }

    async fn load_items<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.try_load(key).await {
            Ok(Some(items)) => items,
            Ok(None) => {
                tracing::debug!(key, "No persisted items");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding unreadable persisted items");
                Vec::new()
            }
        }
    }

    async fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>, CartError> {
        let Some(bytes) = self
            .store
            .get(key)
            .await
            .map_err(|e| read_failure(key, e))?
        else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| read_failure(key, e))
    }

    /// Write a snapshot to both keys.
    ///
    /// Returns `Ok(false)` when a snapshot at least as new was already
    /// committed and this one was skipped. If the second key cannot be
    /// written, the first key is put back to its previous value so storage
    /// never mixes two snapshots.
    pub async fn write(&self, snapshot: &Snapshot) -> Result<bool, CartError> {
        let mut committed = self.committed.lock().await;
        if snapshot.version <= *committed {
            tracing::debug!(
                version = snapshot.version,
                committed = *committed,
                "Skipping stale cart snapshot"
            );
            return Ok(false);
        }

        let previous_cart = self
            .store
            .get(CART_KEY)
            .await
            .map_err(|e| write_failure(CART_KEY, e))?;

        self.write_key(CART_KEY, &snapshot.cart).await?;
        if let Err(e) = self.write_key(SAVED_ITEMS_KEY, &snapshot.saved).await {
            self.restore_cart(previous_cart).await;
            return Err(e);
        }
        *committed = snapshot.version;
        Ok(true)
    }

    async fn restore_cart(&self, previous: Option<Vec<u8>>) {
        let restored = match previous {
            Some(bytes) => self.store.set(CART_KEY, &bytes).await,
            None => self.store.delete(CART_KEY).await,
        };
        if let Err(e) = restored {
            tracing::error!("Failed to roll back {CART_KEY} after a partial write: {e}");
        }
    }

    async fn write_key<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), CartError> {
        let bytes = serde_json::to_vec(items).map_err(|e| write_failure(key, e))?;
        self.store
            .set(key, &bytes)
            .await
            .map_err(|e| write_failure(key, e))
    }

    /// Fire-and-forget save on `runtime`. Failures are logged only.
    pub fn spawn_save(&self, runtime: &Handle, snapshot: Snapshot) -> JoinHandle<()> {
        let gateway = self.clone();
        runtime.spawn(async move {
            match gateway.write(&snapshot).await {
                Ok(true) => tracing::debug!(
                    version = snapshot.version,
                    cart_items = snapshot.cart.len(),
                    saved_items = snapshot.saved.len(),
                    "Persisted cart snapshot"
                ),
                Ok(false) => {}
                Err(e) => tracing::error!(version = snapshot.version, "Failed to persist cart: {e}"),
            }
        })
    }
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGateway").finish_non_exhaustive()
    }
}

fn read_failure(key: &str, e: impl std::fmt::Display) -> CartError {
    CartError::PersistenceReadFailure {
        key: key.to_string(),
        reason: e.to_string(),
    }
}

fn write_failure(key: &str, e: impl std::fmt::Display) -> CartError {
    CartError::PersistenceWriteFailure {
        key: key.to_string(),
        reason: e.to_string(),
    }
}
