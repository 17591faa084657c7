//! Federation roster storage trait.

use crate::StoreError;
use rondo_types::FederationMember;

/// Snapshot store for the current federation roster.
///
/// The roster is small; the whole ordered list is rewritten on every change.
pub trait MemberStore: Send + Sync {
    /// Persist the roster, replacing any previous snapshot.
    fn save(&self, members: &[FederationMember]) -> Result<(), StoreError>;

    /// Load the persisted roster. `None` on first run (no snapshot yet).
    fn load(&self) -> Result<Option<Vec<FederationMember>>, StoreError>;
}
