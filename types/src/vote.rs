//! The atomic unit of voting carried in block coinbases.

use crate::hash::Hash256;
use crate::member::FederationMember;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a vote asks for. Encoded as a single byte on the wire.
///
/// Unrecognized key bytes are skipped with a warning during extraction so
/// that future vote kinds do not invalidate old nodes' blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteKey {
    AddMember,
    KickMember,
    WhitelistHash,
    RemoveHash,
}

impl VoteKey {
    pub fn as_u8(&self) -> u8 {
        match self {
            VoteKey::AddMember => 0,
            VoteKey::KickMember => 1,
            VoteKey::WhitelistHash => 2,
            VoteKey::RemoveHash => 3,
        }
    }

    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(VoteKey::AddMember),
            1 => Some(VoteKey::KickMember),
            2 => Some(VoteKey::WhitelistHash),
            3 => Some(VoteKey::RemoveHash),
            _ => None,
        }
    }

    /// Whether the payload is a canonical member serialization.
    pub fn targets_member(&self) -> bool {
        matches!(self, VoteKey::AddMember | VoteKey::KickMember)
    }
}

/// A single vote: what is being voted on, and the opaque payload.
///
/// Two votes are equal iff `key` and `payload` bytes match exactly; poll
/// aggregation relies on this.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VotingData {
    pub key: VoteKey,
    pub payload: Vec<u8>,
}

impl VotingData {
    pub fn add_member(member: &FederationMember) -> Self {
        Self {
            key: VoteKey::AddMember,
            payload: member.to_payload(),
        }
    }

    pub fn kick_member(member: &FederationMember) -> Self {
        Self {
            key: VoteKey::KickMember,
            payload: member.to_payload(),
        }
    }

    pub fn whitelist_hash(hash: Hash256) -> Self {
        Self {
            key: VoteKey::WhitelistHash,
            payload: hash.as_bytes().to_vec(),
        }
    }

    pub fn remove_hash(hash: Hash256) -> Self {
        Self {
            key: VoteKey::RemoveHash,
            payload: hash.as_bytes().to_vec(),
        }
    }

    /// Decode the payload as a federation member (for member-vote keys).
    pub fn member(&self) -> Option<FederationMember> {
        if !self.key.targets_member() {
            return None;
        }
        FederationMember::from_payload(&self.payload)
    }

    /// Decode the payload as a 32-byte digest (for hash-vote keys).
    pub fn hash(&self) -> Option<Hash256> {
        if self.key.targets_member() {
            return None;
        }
        let arr: [u8; 32] = self.payload.as_slice().try_into().ok()?;
        Some(Hash256::new(arr))
    }
}

impl fmt::Debug for VotingData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VotingData({:?}, ", self.key)?;
        for b in self.payload.iter().take(4) {
            write!(f, "{:02x}", b)?;
        }
        write!(f, "\u{2026})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::PublicKey;

    fn member(byte: u8) -> FederationMember {
        FederationMember::new(PublicKey::new([byte; 32]))
    }

    #[test]
    fn equality_is_exact_bytes() {
        let a = VotingData::add_member(&member(1));
        let b = VotingData::add_member(&member(1));
        let c = VotingData::kick_member(&member(1));
        assert_eq!(a, b);
        assert_ne!(a, c); // same payload, different key
    }

    #[test]
    fn vote_key_byte_roundtrip() {
        for key in [
            VoteKey::AddMember,
            VoteKey::KickMember,
            VoteKey::WhitelistHash,
            VoteKey::RemoveHash,
        ] {
            assert_eq!(VoteKey::from_u8(key.as_u8()), Some(key));
        }
        assert_eq!(VoteKey::from_u8(200), None);
    }

    #[test]
    fn member_accessor_requires_member_key() {
        let m = member(5);
        assert_eq!(VotingData::kick_member(&m).member(), Some(m));
        assert!(VotingData::whitelist_hash(Hash256::new([0; 32])).member().is_none());
    }

    #[test]
    fn hash_accessor_requires_hash_key() {
        let h = Hash256::new([9; 32]);
        assert_eq!(VotingData::whitelist_hash(h).hash(), Some(h));
        assert!(VotingData::add_member(&member(1)).hash().is_none());
    }
}
