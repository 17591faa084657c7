//! Automatic eviction of idle federation members.
//!
//! The kicker tracks when each member last produced a block and, once a
//! member has been silent longer than the configured threshold, queues a
//! kick vote with the voting manager. Eviction itself still requires a
//! majority: every healthy member's kicker reaches the same conclusion from
//! the chain, votes, and the normal poll machinery does the rest.

pub mod error;
pub mod kicker;

pub use error::KickerError;
pub use kicker::IdleMembersKicker;
