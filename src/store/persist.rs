//! Persistence seam.
//!
//! The engine's only contact with persisted storage: an async-agnostic client
//! the host implements over its HTTP stack. The core exchanges the flat
//! component document of [`ComponentStore::load`]/[`ComponentStore::to_value`]
//! and never sees transport details.

use serde_json::Value as Json;

use crate::foundation::error::MetascoreResult;
use crate::store::tree::ComponentStore;

/// Host-implemented storage client.
pub trait PersistenceClient {
    /// Fetch a serialized component document.
    fn load(&mut self, url: &str) -> MetascoreResult<Json>;
    /// Persist a serialized component document.
    fn save(&mut self, url: &str, data: &Json) -> MetascoreResult<()>;
    /// Fetch an earlier revision of a document.
    fn restore(&mut self, url: &str, version_id: &str) -> MetascoreResult<Json>;
}

/// Load a store through a persistence client.
pub fn load_store(client: &mut dyn PersistenceClient, url: &str) -> MetascoreResult<ComponentStore> {
    ComponentStore::load(client.load(url)?)
}

/// Save a store through a persistence client.
pub fn save_store(
    client: &mut dyn PersistenceClient,
    url: &str,
    store: &ComponentStore,
) -> MetascoreResult<()> {
    client.save(url, &store.to_value()?)
}

/// Restore a store from an earlier revision.
pub fn restore_store(
    client: &mut dyn PersistenceClient,
    url: &str,
    version_id: &str,
) -> MetascoreResult<ComponentStore> {
    ComponentStore::load(client.restore(url, version_id)?)
}
