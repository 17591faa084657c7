//! Rondo governance node.
//!
//! Wires the voting manager, federation manager and idle-members kicker
//! together, drives them from block connect/disconnect notifications in
//! topological order, publishes roster events on the in-process event bus,
//! and exposes the administrative surface the HTTP layer calls.

pub mod admin;
pub mod config;
pub mod error;
pub mod event_bus;
pub mod logging;
pub mod node;
pub mod shutdown;

pub use admin::{AdminError, VoteOutcome};
pub use config::{GenesisMemberConfig, NodeConfig};
pub use error::NodeError;
pub use event_bus::{EventBus, NodeEvent};
pub use node::{NodeStores, RondoNode};
pub use shutdown::ShutdownSignal;
