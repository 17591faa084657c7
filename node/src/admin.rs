//! The administrative surface exposed to the HTTP layer.
//!
//! Validation failures (malformed hex, multisig targets, unknown members)
//! never change state and come back as [`AdminError::Validation`] with a
//! stable human-readable message. A duplicate vote is a soft outcome, not an
//! error: the caller learns the vote is already in flight and nothing is
//! enqueued.

use thiserror::Error;

use rondo_types::{FederationMember, Hash256, PublicKey, VotingData};
use rondo_voting::VotingError;

use crate::node::GovernanceCore;
use crate::{NodeError, RondoNode};

#[derive(Debug, Error)]
pub enum AdminError {
    /// Bad input at the admin edge; no state change.
    #[error("{0}")]
    Validation(String),

    /// An internal failure while scheduling; fatal upstream.
    #[error(transparent)]
    Node(#[from] NodeError),
}

/// Result of a vote request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The vote was queued for the next block this node produces.
    Scheduled,
    /// This node already scheduled or cast an identical vote; nothing queued.
    AlreadyVoted,
}

fn parse_pubkey(hex: &str) -> Result<PublicKey, AdminError> {
    PublicKey::from_hex(hex)
        .ok_or_else(|| AdminError::Validation(format!("invalid public key hex: {hex}")))
}

fn parse_hash(hex: &str) -> Result<Hash256, AdminError> {
    Hash256::from_hex(hex)
        .ok_or_else(|| AdminError::Validation(format!("invalid 32-byte hash hex: {hex}")))
}

fn schedule(core: &GovernanceCore, vote: VotingData) -> Result<VoteOutcome, AdminError> {
    match core.voting.schedule_vote(vote, &core.federation) {
        Ok(()) => Ok(VoteOutcome::Scheduled),
        Err(VotingError::DuplicateVote) => Ok(VoteOutcome::AlreadyVoted),
        Err(err @ VotingError::MultisigMember) => Err(AdminError::Validation(err.to_string())),
        Err(VotingError::InvalidVote(msg)) => Err(AdminError::Validation(msg)),
        Err(other) => Err(AdminError::Node(other.into())),
    }
}

impl RondoNode {
    /// Vote to add a member by pubkey hex.
    pub fn vote_add_member(&self, pubkey_hex: &str) -> Result<VoteOutcome, AdminError> {
        let pubkey = parse_pubkey(pubkey_hex)?;
        let core = self.read_core();
        // An existing multisig member must not be targetable through the add
        // path either.
        if let Some(existing) = core
            .federation
            .members()
            .iter()
            .find(|m| m.pubkey == pubkey)
        {
            if existing.is_multisig {
                return Err(AdminError::Validation(
                    VotingError::MultisigMember.to_string(),
                ));
            }
        }
        schedule(&core, VotingData::add_member(&FederationMember::new(pubkey)))
    }

    /// Vote to kick a member by pubkey hex. The target must currently be in
    /// the roster — the vote payload carries the member's canonical
    /// serialization, flags included.
    pub fn vote_kick_member(&self, pubkey_hex: &str) -> Result<VoteOutcome, AdminError> {
        let pubkey = parse_pubkey(pubkey_hex)?;
        let core = self.read_core();
        let member = core
            .federation
            .members()
            .iter()
            .find(|m| m.pubkey == pubkey)
            .copied()
            .ok_or_else(|| {
                AdminError::Validation(format!("not a federation member: {pubkey_hex}"))
            })?;
        schedule(&core, VotingData::kick_member(&member))
    }

    /// Vote to whitelist a 32-byte hash (hex).
    pub fn vote_whitelist_hash(&self, hash_hex: &str) -> Result<VoteOutcome, AdminError> {
        let hash = parse_hash(hash_hex)?;
        let core = self.read_core();
        schedule(&core, VotingData::whitelist_hash(hash))
    }

    /// Vote to remove a 32-byte hash (hex) from the whitelist.
    pub fn vote_remove_hash(&self, hash_hex: &str) -> Result<VoteOutcome, AdminError> {
        let hash = parse_hash(hash_hex)?;
        let core = self.read_core();
        schedule(&core, VotingData::remove_hash(hash))
    }
}
