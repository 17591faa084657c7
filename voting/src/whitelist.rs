//! The governance-approved hash whitelist.

use crate::VotingError;
use rondo_store::WhitelistStore;
use rondo_types::Hash256;

/// Ordered set of whitelisted hashes, mutated only by poll execution and
/// reversal. Insertion order is preserved so every node persists an identical
/// file.
pub struct WhitelistRepository {
    hashes: Vec<Hash256>,
    store: Box<dyn WhitelistStore>,
}

impl WhitelistRepository {
    /// Load the persisted whitelist; empty on first run.
    pub fn load(store: Box<dyn WhitelistStore>) -> Result<Self, VotingError> {
        let hashes = store.load()?.unwrap_or_default();
        Ok(Self { hashes, store })
    }

    pub fn contains(&self, hash: &Hash256) -> bool {
        self.hashes.contains(hash)
    }

    pub fn hashes(&self) -> &[Hash256] {
        &self.hashes
    }

    /// Add a hash. Persists before committing; adding a present hash is a
    /// no-op returning `false`.
    pub fn add(&mut self, hash: Hash256) -> Result<bool, VotingError> {
        if self.contains(&hash) {
            return Ok(false);
        }
        let mut next = self.hashes.clone();
        next.push(hash);
        self.store.save(&next)?;
        self.hashes = next;
        Ok(true)
    }

    /// Reinstate a hash at a specific position (reorg reversal of a removal).
    pub fn insert_at(&mut self, index: usize, hash: Hash256) -> Result<bool, VotingError> {
        if self.contains(&hash) {
            return Ok(false);
        }
        let mut next = self.hashes.clone();
        next.insert(index.min(next.len()), hash);
        self.store.save(&next)?;
        self.hashes = next;
        Ok(true)
    }

    /// Remove a hash. Removing an absent hash is a no-op returning `false`.
    pub fn remove(&mut self, hash: &Hash256) -> Result<bool, VotingError> {
        let Some(index) = self.hashes.iter().position(|h| h == hash) else {
            return Ok(false);
        };
        let mut next = self.hashes.clone();
        next.remove(index);
        self.store.save(&next)?;
        self.hashes = next;
        Ok(true)
    }
}
