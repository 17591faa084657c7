//! PoA slot assignment.
//!
//! Block production rotates round-robin through the roster in fixed time
//! slots; the header timestamp therefore pins the producer. The governance
//! core uses this to attribute coinbase votes to a member and to mark the
//! producer active for idle tracking.

use rondo_types::{FederationMember, Timestamp};

/// The member whose slot covers `time`, given the roster `members`.
///
/// Deterministic in the roster order: slot index is
/// `(time / slot_duration) mod roster_len`.
pub fn slot_holder(
    members: &[FederationMember],
    time: Timestamp,
    slot_duration_secs: u64,
) -> Option<FederationMember> {
    if members.is_empty() {
        return None;
    }
    let slot = time.slot(slot_duration_secs)?;
    let index = (slot % members.len() as u64) as usize;
    Some(members[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rondo_types::PublicKey;

    fn member(byte: u8) -> FederationMember {
        FederationMember::new(PublicKey::new([byte; 32]))
    }

    #[test]
    fn rotates_through_roster() {
        let roster = vec![member(1), member(2), member(3)];
        assert_eq!(slot_holder(&roster, Timestamp::from_secs(0), 16), Some(member(1)));
        assert_eq!(slot_holder(&roster, Timestamp::from_secs(16), 16), Some(member(2)));
        assert_eq!(slot_holder(&roster, Timestamp::from_secs(32), 16), Some(member(3)));
        assert_eq!(slot_holder(&roster, Timestamp::from_secs(48), 16), Some(member(1)));
    }

    #[test]
    fn mid_slot_time_maps_to_same_member() {
        let roster = vec![member(1), member(2)];
        assert_eq!(slot_holder(&roster, Timestamp::from_secs(17), 16), Some(member(2)));
        assert_eq!(slot_holder(&roster, Timestamp::from_secs(31), 16), Some(member(2)));
    }

    #[test]
    fn empty_roster_or_zero_slot_is_none() {
        assert_eq!(slot_holder(&[], Timestamp::from_secs(0), 16), None);
        assert_eq!(slot_holder(&[member(1)], Timestamp::from_secs(0), 0), None);
    }
}
