//! In-process publish/subscribe hub for governance events.

use rondo_types::{BlockHash, FederationMember};

/// Governance-level events observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeEvent {
    /// A block was connected and fully processed by the governance core.
    BlockConnected { hash: BlockHash, height: u64 },
    /// A block was disconnected and its effects unwound.
    BlockDisconnected { hash: BlockHash, height: u64 },
    /// A member joined the federation (poll execution or kick reversal).
    MemberAdded { member: FederationMember },
    /// A member left the federation (kick execution or add reversal).
    MemberKicked { member: FederationMember },
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline on the emitting thread, in subscription
/// order; `emit` returns only after every listener has run. Member events for
/// a block are published before the block's own `BlockConnected`, so
/// subscribers always observe the post-block roster in order.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&NodeEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&NodeEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &NodeEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
