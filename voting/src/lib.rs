//! On-chain voting for the Rondo federation.
//!
//! The [`VotingManager`] aggregates per-member votes carried in block
//! coinbases into polls, finalizes a poll once a majority of the federation
//! has voted for it, and executes the resulting roster/whitelist change after
//! a reorg-safety delay of `max_reorg_length` blocks. Every state transition
//! is reversible: block disconnects unwind executions, approvals and votes in
//! the exact reverse of how they were applied.

pub mod encoding;
pub mod error;
pub mod manager;
pub mod schedule;
pub mod whitelist;

pub use encoding::{encode_votes_script, extract_votes, VOTING_OUTPUT_PREFIX_LEN};
pub use error::VotingError;
pub use manager::VotingManager;
pub use schedule::ScheduledVotes;
pub use whitelist::WhitelistRepository;
