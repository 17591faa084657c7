//! Whitelisted-hash storage trait.

use crate::StoreError;
use rondo_types::Hash256;

/// Snapshot store for the governance-approved hash whitelist.
pub trait WhitelistStore: Send + Sync {
    /// Persist the ordered hash set, replacing any previous snapshot.
    fn save(&self, hashes: &[Hash256]) -> Result<(), StoreError>;

    /// Load the persisted set. `None` on first run (no snapshot yet).
    fn load(&self) -> Result<Option<Vec<Hash256>>, StoreError>;
}
