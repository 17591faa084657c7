//! The outgoing scheduled-votes queue.
//!
//! Votes this node intends to cast wait here until the block producer drains
//! them into the next mined coinbase. The queue is guarded by its own mutex
//! so the producer thread can drain it without taking the write lock that
//! protects poll state.

use rondo_types::VotingData;
use std::collections::VecDeque;
use std::sync::Mutex;

/// FIFO queue of votes awaiting inclusion in a block this node produces.
#[derive(Default)]
pub struct ScheduledVotes {
    queue: Mutex<VecDeque<VotingData>>,
}

impl ScheduledVotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a vote unless an identical one is already waiting.
    /// Returns `false` for a duplicate.
    pub fn push_unique(&self, vote: VotingData) -> bool {
        let mut queue = self.queue.lock().unwrap();
        if queue.contains(&vote) {
            return false;
        }
        queue.push_back(vote);
        true
    }

    /// Whether an identical vote is already queued.
    pub fn contains(&self, vote: &VotingData) -> bool {
        self.queue.lock().unwrap().contains(vote)
    }

    /// Snapshot of the queue, oldest first.
    pub fn snapshot(&self) -> Vec<VotingData> {
        self.queue.lock().unwrap().iter().cloned().collect()
    }

    /// Atomically take everything, oldest first, leaving the queue empty.
    /// Called exactly once per block this node produces.
    pub fn drain(&self) -> Vec<VotingData> {
        self.queue.lock().unwrap().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
