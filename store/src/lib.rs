//! Abstract storage traits for the Rondo governance core.
//!
//! Every storage backend (the file backend, in-memory stores for testing)
//! implements these traits. The rest of the codebase depends only on the
//! traits.

pub mod error;
pub mod last_active;
pub mod members;
pub mod polls;
pub mod whitelist;

pub use error::StoreError;
pub use last_active::LastActiveStore;
pub use members::MemberStore;
pub use polls::PollLog;
pub use whitelist::WhitelistStore;
