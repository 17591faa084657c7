//! The authoritative ledger of current federation members.

use crate::FederationError;
use rondo_store::MemberStore;
use rondo_types::{FederationMember, PublicKey};
use std::collections::HashSet;

/// Roster mutation, published on the event bus after persistence completes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RosterEvent {
    MemberAdded(FederationMember),
    MemberKicked(FederationMember),
}

/// Holds the canonical, ordered federation roster.
///
/// Mutations only happen through poll execution and reversal in the voting
/// manager; everything else reads. Members are appended in insertion order
/// and removal preserves the relative order of the remainder, so the roster
/// order — and with it the PoA slot assignment — is deterministic across
/// nodes.
pub struct FederationManager {
    members: Vec<FederationMember>,
    /// This node's own key, if it runs with a federation identity.
    own_key: Option<PublicKey>,
    store: Box<dyn MemberStore>,
}

impl FederationManager {
    /// Load the persisted roster, seeding from `genesis` on first run.
    ///
    /// Genesis is where multisig members enter; they are never voted in.
    pub fn load(
        genesis: Vec<FederationMember>,
        own_key: Option<PublicKey>,
        store: Box<dyn MemberStore>,
    ) -> Result<Self, FederationError> {
        let mut seen = HashSet::new();
        for member in &genesis {
            if !seen.insert(member.pubkey) {
                return Err(FederationError::DuplicateGenesisMember(
                    member.pubkey.to_hex(),
                ));
            }
        }

        let members = match store.load()? {
            Some(persisted) => persisted,
            None => {
                store.save(&genesis)?;
                genesis
            }
        };
        tracing::info!(members = members.len(), "federation roster loaded");

        Ok(Self {
            members,
            own_key,
            store,
        })
    }

    /// The current roster; order defines the PoA slot assignment.
    pub fn members(&self) -> &[FederationMember] {
        &self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_member(&self, key: &PublicKey) -> bool {
        self.members.iter().any(|m| m.pubkey == *key)
    }

    /// Whether this process itself holds a federation identity.
    pub fn is_federation_member(&self) -> bool {
        match self.own_key {
            Some(key) => self.is_member(&key),
            None => false,
        }
    }

    /// This node's own pubkey, or `None` when running without one.
    pub fn current_key(&self) -> Option<PublicKey> {
        self.own_key
    }

    /// Insert a member at the end of the roster.
    ///
    /// Persists the new roster before committing it in memory; the returned
    /// event, if any, is published only after this returns. Adding a key
    /// already present is a no-op (`None`).
    pub fn add_member(
        &mut self,
        member: FederationMember,
    ) -> Result<Option<RosterEvent>, FederationError> {
        if self.is_member(&member.pubkey) {
            return Ok(None);
        }
        let mut next = self.members.clone();
        next.push(member);
        self.store.save(&next)?;
        self.members = next;
        tracing::info!(member = %member.pubkey, "federation member added");
        Ok(Some(RosterEvent::MemberAdded(member)))
    }

    /// Reinstate a member at a specific roster position.
    ///
    /// Only used when a kick execution is reverted by a reorg: the member
    /// returns to the slot position it held before the kick, keeping the
    /// roster byte-identical with nodes that never saw the kicked branch.
    pub fn insert_member_at(
        &mut self,
        index: usize,
        member: FederationMember,
    ) -> Result<Option<RosterEvent>, FederationError> {
        if self.is_member(&member.pubkey) {
            return Ok(None);
        }
        let mut next = self.members.clone();
        next.insert(index.min(next.len()), member);
        self.store.save(&next)?;
        self.members = next;
        tracing::info!(member = %member.pubkey, index, "federation member reinstated");
        Ok(Some(RosterEvent::MemberAdded(member)))
    }

    /// Remove a member, preserving the order of the remainder.
    ///
    /// Removing a key that is not in the roster is a no-op (`None`).
    pub fn remove_member(
        &mut self,
        member: &FederationMember,
    ) -> Result<Option<RosterEvent>, FederationError> {
        let Some(index) = self.members.iter().position(|m| m.pubkey == member.pubkey) else {
            return Ok(None);
        };
        let mut next = self.members.clone();
        let removed = next.remove(index);
        self.store.save(&next)?;
        self.members = next;
        tracing::info!(member = %removed.pubkey, "federation member removed");
        Ok(Some(RosterEvent::MemberKicked(removed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rondo_nullables::MemoryMemberStore;
    use rondo_store::MemberStore as _;

    fn key(byte: u8) -> PublicKey {
        PublicKey::new([byte; 32])
    }

    fn member(byte: u8) -> FederationMember {
        FederationMember::new(key(byte))
    }

    fn manager_with(genesis: Vec<FederationMember>, own: Option<PublicKey>) -> FederationManager {
        FederationManager::load(genesis, own, Box::new(MemoryMemberStore::new())).unwrap()
    }

    #[test]
    fn first_run_uses_genesis_roster() {
        let genesis = vec![member(1), member(2)];
        let manager =
            FederationManager::load(genesis.clone(), None, Box::new(MemoryMemberStore::new()))
                .unwrap();
        assert_eq!(manager.members(), genesis.as_slice());
    }

    #[test]
    fn persisted_roster_wins_over_genesis() {
        let store = MemoryMemberStore::new();
        store.save(&[member(9)]).unwrap();
        let manager =
            FederationManager::load(vec![member(1), member(2)], None, Box::new(store)).unwrap();
        assert_eq!(manager.members(), &[member(9)]);
    }

    #[test]
    fn duplicate_genesis_member_is_rejected() {
        let result = FederationManager::load(
            vec![member(1), member(1)],
            None,
            Box::new(MemoryMemberStore::new()),
        );
        assert!(matches!(
            result,
            Err(FederationError::DuplicateGenesisMember(_))
        ));
    }

    #[test]
    fn add_appends_and_emits() {
        let mut manager = manager_with(vec![member(1)], None);
        let event = manager.add_member(member(2)).unwrap();
        assert_eq!(event, Some(RosterEvent::MemberAdded(member(2))));
        assert_eq!(manager.members(), &[member(1), member(2)]);
    }

    #[test]
    fn add_existing_is_noop() {
        let mut manager = manager_with(vec![member(1)], None);
        assert_eq!(manager.add_member(member(1)).unwrap(), None);
        assert_eq!(manager.member_count(), 1);
    }

    #[test]
    fn remove_preserves_remaining_order() {
        let mut manager = manager_with(vec![member(1), member(2), member(3)], None);
        let event = manager.remove_member(&member(2)).unwrap();
        assert_eq!(event, Some(RosterEvent::MemberKicked(member(2))));
        assert_eq!(manager.members(), &[member(1), member(3)]);
    }

    #[test]
    fn insert_at_restores_position() {
        let mut manager = manager_with(vec![member(1), member(2), member(3)], None);
        manager.remove_member(&member(2)).unwrap();
        let event = manager.insert_member_at(1, member(2)).unwrap();
        assert_eq!(event, Some(RosterEvent::MemberAdded(member(2))));
        assert_eq!(manager.members(), &[member(1), member(2), member(3)]);
    }

    #[test]
    fn insert_at_with_present_member_is_noop() {
        let mut manager = manager_with(vec![member(1)], None);
        assert_eq!(manager.insert_member_at(0, member(1)).unwrap(), None);
        assert_eq!(manager.members(), &[member(1)]);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut manager = manager_with(vec![member(1)], None);
        assert_eq!(manager.remove_member(&member(5)).unwrap(), None);
        assert_eq!(manager.member_count(), 1);
    }

    #[test]
    fn is_federation_member_requires_roster_presence() {
        let manager = manager_with(vec![member(1)], Some(key(1)));
        assert!(manager.is_federation_member());

        let outsider = manager_with(vec![member(1)], Some(key(9)));
        assert!(!outsider.is_federation_member());

        let keyless = manager_with(vec![member(1)], None);
        assert!(!keyless.is_federation_member());
        assert_eq!(keyless.current_key(), None);
    }
}
