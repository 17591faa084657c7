//! File storage backend for the Rondo governance core.
//!
//! Implements the storage traits from `rondo_store` against the node's data
//! directory: an append-only framed log for polls, JSON snapshots rewritten
//! atomically (temp file + rename) for the roster, last-active map and
//! whitelist.

pub mod error;
pub mod last_active;
pub mod members;
pub mod poll_log;
mod snapshot;
pub mod whitelist;

pub use error::FsError;
pub use last_active::JsonLastActiveStore;
pub use members::JsonMemberStore;
pub use poll_log::FilePollLog;
pub use whitelist::JsonWhitelistStore;

use std::path::Path;

/// File names inside the data directory.
pub const POLLS_LOG_FILE: &str = "polls.log";
pub const FEDERATION_FILE: &str = "federation.json";
pub const LAST_ACTIVE_FILE: &str = "last_active.json";
pub const WHITELIST_FILE: &str = "whitelist.json";

/// Open every governance store under `data_dir`, creating the directory
/// if needed.
pub fn open_stores(
    data_dir: &Path,
) -> Result<
    (
        FilePollLog,
        JsonMemberStore,
        JsonLastActiveStore,
        JsonWhitelistStore,
    ),
    FsError,
> {
    std::fs::create_dir_all(data_dir)?;
    let polls = FilePollLog::open(data_dir.join(POLLS_LOG_FILE))?;
    let members = JsonMemberStore::new(data_dir.join(FEDERATION_FILE));
    let last_active = JsonLastActiveStore::new(data_dir.join(LAST_ACTIVE_FILE));
    let whitelist = JsonWhitelistStore::new(data_dir.join(WHITELIST_FILE));
    Ok((polls, members, last_active, whitelist))
}
