//! Polls — aggregated on-chain votes — and the poll-log record format.

use crate::hash::BlockHash;
use crate::keys::PublicKey;
use crate::vote::VotingData;
use serde::{Deserialize, Serialize};

/// An aggregated vote being accumulated, or already finalized.
///
/// Lifecycle: Pending → Approved → Executed, with every transition reversible
/// by a reorg. The phase is derived from which height markers are set:
/// no `poll_applied_height` means Pending, `poll_applied_height` without
/// `executed_height` means Approved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    /// Monotonically assigned on creation; also the execution tie-break order.
    pub id: u64,
    /// The vote being aggregated.
    pub data: VotingData,
    /// Chain position where the first vote appeared.
    pub start_height: u64,
    pub start_hash: BlockHash,
    /// Voters in favor, in the order their votes appeared on chain.
    /// Duplicate-free; insertion order makes replay deterministic.
    pub votes_in_favor: Vec<PublicKey>,
    /// Height at which the majority was reached; `None` while Pending.
    pub poll_applied_height: Option<u64>,
    /// Height at which the effect was committed; `None` until Executed.
    pub executed_height: Option<u64>,
}

impl Poll {
    pub fn new(
        id: u64,
        data: VotingData,
        start_height: u64,
        start_hash: BlockHash,
        first_voter: PublicKey,
    ) -> Self {
        Self {
            id,
            data,
            start_height,
            start_hash,
            votes_in_favor: vec![first_voter],
            poll_applied_height: None,
            executed_height: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.poll_applied_height.is_none()
    }

    pub fn is_approved(&self) -> bool {
        self.poll_applied_height.is_some() && self.executed_height.is_none()
    }

    pub fn is_executed(&self) -> bool {
        self.executed_height.is_some()
    }

    pub fn has_voted(&self, voter: &PublicKey) -> bool {
        self.votes_in_favor.contains(voter)
    }

    /// Record a vote. Returns `false` (and changes nothing) for a duplicate.
    pub fn add_vote(&mut self, voter: PublicKey) -> bool {
        if self.has_voted(&voter) {
            return false;
        }
        self.votes_in_favor.push(voter);
        true
    }

    /// Withdraw a vote during reorg reversal. Returns `false` if absent.
    pub fn remove_vote(&mut self, voter: &PublicKey) -> bool {
        let before = self.votes_in_favor.len();
        self.votes_in_favor.retain(|v| v != voter);
        self.votes_in_favor.len() != before
    }

    /// Voter pubkeys in hex, as exposed at the admin edge.
    pub fn votes_in_favor_hex(&self) -> Vec<String> {
        self.votes_in_favor.iter().map(|v| v.to_hex()).collect()
    }
}

/// One mutation in the append-only poll log.
///
/// The in-memory poll image is rebuilt by replaying these records at startup;
/// every mutation is appended before the in-memory change is made, so crash
/// recovery is deterministic. Reorg reversal appends explicit revert records
/// rather than rewriting history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollLogRecord {
    Created {
        id: u64,
        data: VotingData,
        start_height: u64,
        start_hash: BlockHash,
        first_voter: PublicKey,
    },
    VoteAdded {
        id: u64,
        voter: PublicKey,
        /// Height of the block that carried the vote; reorg reversal removes
        /// exactly the votes recorded at the disconnected height.
        height: u64,
    },
    VoteRemoved {
        id: u64,
        voter: PublicKey,
    },
    Approved {
        id: u64,
        height: u64,
    },
    ApprovalReverted {
        id: u64,
    },
    Executed {
        id: u64,
        height: u64,
    },
    ExecutionReverted {
        id: u64,
    },
    Deleted {
        id: u64,
    },
}
