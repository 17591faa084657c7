//! Poll-log storage trait.

use crate::StoreError;
use rondo_types::PollLogRecord;

/// Append-only log of poll mutations.
///
/// The voting manager appends a record for every mutation before applying it
/// in memory; at startup the in-memory poll image is rebuilt by replaying the
/// log in append order. A failed append is fatal to the node — the in-memory
/// and on-disk images would otherwise diverge.
pub trait PollLog: Send + Sync {
    /// Durably append one record. Must not return until the record would
    /// survive a process crash.
    fn append(&self, record: &PollLogRecord) -> Result<(), StoreError>;

    /// Read back every record in append order.
    fn replay(&self) -> Result<Vec<PollLogRecord>, StoreError>;
}

impl<T: PollLog + ?Sized> PollLog for std::sync::Arc<T> {
    fn append(&self, record: &PollLogRecord) -> Result<(), StoreError> {
        (**self).append(record)
    }

    fn replay(&self) -> Result<Vec<PollLogRecord>, StoreError> {
        (**self).replay()
    }
}
