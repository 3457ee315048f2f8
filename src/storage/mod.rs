//! Persistence backends for the ticket collection
//!
//! The cache only talks to [`TicketBackend`]. Two implementations exist:
//! [`LocalStorageBackend`] keeps the collection as JSON in a key-value store,
//! and [`MockApiBackend`] simulates a remote API with latency.

mod key_value;
mod local;
mod mock_api;
mod repository;

pub use key_value::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use local::LocalStorageBackend;
pub use mock_api::{MockApiBackend, demo_tickets};
pub use repository::TicketBackend;

#[cfg(test)]
pub use repository::MockTicketBackend;

use crate::config::{ApiConfig, BackendKind, StorageConfig};
use std::sync::Arc;

/// Build the backend selected by configuration
#[must_use]
pub fn open_backend(storage: &StorageConfig, api: &ApiConfig) -> Arc<dyn TicketBackend> {
    match storage.backend {
        BackendKind::Local => Arc::new(LocalStorageBackend::open(
            FileKeyValueStore::new(&storage.data_dir),
            storage.storage_key.clone(),
        )),
        BackendKind::Mock => Arc::new(MockApiBackend::seeded(api.clone())),
    }
}
