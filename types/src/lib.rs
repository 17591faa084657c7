//! Core types shared across the Rondo PoA federation node.

pub mod block;
pub mod hash;
pub mod keys;
pub mod member;
pub mod params;
pub mod poll;
pub mod time;
pub mod vote;

pub use block::{Block, BlockHeader};
pub use hash::{BlockHash, Hash256};
pub use keys::PublicKey;
pub use member::{FederationMember, MEMBER_PAYLOAD_LEN};
pub use params::PoaParams;
pub use poll::{Poll, PollLogRecord};
pub use time::{Clock, SystemClock, Timestamp};
pub use vote::{VoteKey, VotingData};
