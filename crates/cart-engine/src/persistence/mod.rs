//! Durable key-value persistence for cart state.
//!
//! Backends implement [`KeyValueStore`] over raw bytes; the
//! [`PersistenceGateway`] layers JSON serialization, the two logical keys and
//! best-effort semantics on top.

mod file;
mod gateway;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileStore;
pub use gateway::{PersistenceGateway, Snapshot};
pub use memory::MemoryStore;

/// Key holding the JSON array of cart items.
pub const CART_KEY: &str = "cart";

/// Key holding the JSON array of saved items.
pub const SAVED_ITEMS_KEY: &str = "savedItems";

/// Errors raised by storage backends.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored bytes are not valid JSON for the expected shape.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Byte-oriented key-value backend.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `None` if the key was never written.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Delete a value. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
