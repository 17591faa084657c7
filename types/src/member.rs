//! Federation member identity and its canonical vote payload.

use crate::keys::PublicKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flags byte, bit 0: member participates in the multisig redeem script.
const FLAG_MULTISIG: u8 = 0b0000_0001;

/// Length of the canonical member payload carried in add/kick votes.
pub const MEMBER_PAYLOAD_LEN: usize = 33;

/// A federation member: a public key authorized to produce blocks.
///
/// Multisig members are structurally immutable — they are injected at genesis
/// and can never be the target of an add or kick poll.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FederationMember {
    pub pubkey: PublicKey,
    pub is_multisig: bool,
}

impl FederationMember {
    pub fn new(pubkey: PublicKey) -> Self {
        Self {
            pubkey,
            is_multisig: false,
        }
    }

    pub fn multisig(pubkey: PublicKey) -> Self {
        Self {
            pubkey,
            is_multisig: true,
        }
    }

    /// Canonical serialization carried in member-vote payloads:
    /// 32 pubkey bytes followed by one flags byte.
    ///
    /// Every node must produce identical bytes for the same member — vote
    /// payloads are compared byte-for-byte when polls aggregate.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(MEMBER_PAYLOAD_LEN);
        bytes.extend_from_slice(self.pubkey.as_bytes());
        bytes.push(if self.is_multisig { FLAG_MULTISIG } else { 0 });
        bytes
    }

    /// Parse the canonical payload. Returns `None` on wrong length or
    /// unrecognized flag bits (non-canonical encodings are not accepted).
    pub fn from_payload(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != MEMBER_PAYLOAD_LEN {
            return None;
        }
        let flags = bytes[32];
        if flags & !FLAG_MULTISIG != 0 {
            return None;
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes[..32]);
        Some(Self {
            pubkey: PublicKey::new(key),
            is_multisig: flags & FLAG_MULTISIG != 0,
        })
    }
}

impl fmt::Debug for FederationMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FederationMember({:?}", self.pubkey)?;
        if self.is_multisig {
            write!(f, ", multisig")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> PublicKey {
        PublicKey::new([byte; 32])
    }

    #[test]
    fn payload_roundtrip() {
        let member = FederationMember::new(key(1));
        assert_eq!(FederationMember::from_payload(&member.to_payload()), Some(member));

        let multisig = FederationMember::multisig(key(2));
        assert_eq!(
            FederationMember::from_payload(&multisig.to_payload()),
            Some(multisig)
        );
    }

    #[test]
    fn payload_length_is_canonical() {
        let member = FederationMember::new(key(3));
        assert_eq!(member.to_payload().len(), MEMBER_PAYLOAD_LEN);
    }

    #[test]
    fn from_payload_rejects_wrong_length() {
        assert!(FederationMember::from_payload(&[0u8; 32]).is_none());
        assert!(FederationMember::from_payload(&[0u8; 34]).is_none());
    }

    #[test]
    fn from_payload_rejects_unknown_flags() {
        let mut bytes = FederationMember::new(key(4)).to_payload();
        bytes[32] = 0b1000_0000;
        assert!(FederationMember::from_payload(&bytes).is_none());
    }
}
