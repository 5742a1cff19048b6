//! In-memory backend for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KeyValueStore, StoreError};

/// Shared in-memory key-value store.
///
/// Clones share the same map, so a test can keep a handle while the gateway
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
    fail_key: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make writes to one key fail, leaving other keys writable.
    pub fn set_fail_key(&self, key: Option<&str>) {
        let mut fail_key = self.fail_key.lock().unwrap_or_else(|e| e.into_inner());
        *fail_key = key.map(str::to_string);
    }

    fn rejects(&self, key: &str) -> bool {
        if self.fail_writes.load(Ordering::SeqCst) {
            return true;
        }
        let fail_key = self.fail_key.lock().unwrap_or_else(|e| e.into_inner());
        fail_key.as_deref() == Some(key)
    }

    /// Stored value decoded as UTF-8, for inspection.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .get(key)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        if self.rejects(key) {
            return Err(StoreError::Unavailable(format!("write to {key} rejected")));
        }
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
