//! Minimal block view consumed by the governance core.
//!
//! Full block validation and serialization live outside this workspace; the
//! governance core only needs the header time (for slot assignment and idle
//! tracking) and the coinbase output scripts (for vote extraction).

use crate::hash::BlockHash;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// The header fields the governance core reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Header timestamp; in a PoA chain this pins the producer's slot.
    pub time: Timestamp,
}

/// A connected or disconnected block as seen by the governance core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub hash: BlockHash,
    pub header: BlockHeader,
    /// Raw output scripts of the coinbase transaction, in transaction order.
    pub coinbase_outputs: Vec<Vec<u8>>,
}

impl Block {
    pub fn new(hash: BlockHash, time: Timestamp, coinbase_outputs: Vec<Vec<u8>>) -> Self {
        Self {
            hash,
            header: BlockHeader { time },
            coinbase_outputs,
        }
    }
}
