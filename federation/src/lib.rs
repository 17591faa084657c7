//! Federation roster management for the Rondo PoA chain.
//!
//! The [`FederationManager`] is the authoritative, in-memory ledger of current
//! federation members. Its insertion order defines the PoA slot assignment;
//! two nodes processing the same block sequence hold byte-identical rosters
//! at every height.

pub mod error;
pub mod manager;
pub mod slots;

pub use error::FederationError;
pub use manager::{FederationManager, RosterEvent};
pub use slots::slot_holder;
