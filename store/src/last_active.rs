//! Last-active timestamp storage trait.

use crate::StoreError;
use rondo_types::PublicKey;
use std::collections::BTreeMap;

/// Snapshot store for per-member last-seen times, keyed by pubkey.
pub trait LastActiveStore: Send + Sync {
    /// Persist the full map, replacing any previous snapshot.
    fn save(&self, last_active: &BTreeMap<PublicKey, u64>) -> Result<(), StoreError>;

    /// Load the persisted map. `None` on first run (no snapshot yet).
    fn load(&self) -> Result<Option<BTreeMap<PublicKey, u64>>, StoreError>;
}

impl<T: LastActiveStore + ?Sized> LastActiveStore for std::sync::Arc<T> {
    fn save(&self, last_active: &BTreeMap<PublicKey, u64>) -> Result<(), StoreError> {
        (**self).save(last_active)
    }

    fn load(&self) -> Result<Option<BTreeMap<PublicKey, u64>>, StoreError> {
        (**self).load()
    }
}
