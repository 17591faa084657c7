//! Nullable stores — thread-safe in-memory storage for testing.

use rondo_store::{LastActiveStore, MemberStore, PollLog, StoreError, WhitelistStore};
use rondo_types::{FederationMember, Hash256, PollLogRecord, PublicKey};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// An in-memory append-only poll log.
#[derive(Default)]
pub struct MemoryPollLog {
    records: Mutex<Vec<PollLogRecord>>,
}

impl MemoryPollLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-load records, as if a previous process had written them.
    pub fn with_records(records: Vec<PollLogRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PollLog for MemoryPollLog {
    fn append(&self, record: &PollLogRecord) -> Result<(), StoreError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn replay(&self) -> Result<Vec<PollLogRecord>, StoreError> {
        Ok(self.records.lock().unwrap().clone())
    }
}

/// An in-memory roster snapshot store.
#[derive(Default)]
pub struct MemoryMemberStore {
    members: Mutex<Option<Vec<FederationMember>>>,
}

impl MemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemberStore for MemoryMemberStore {
    fn save(&self, members: &[FederationMember]) -> Result<(), StoreError> {
        *self.members.lock().unwrap() = Some(members.to_vec());
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<FederationMember>>, StoreError> {
        Ok(self.members.lock().unwrap().clone())
    }
}

/// An in-memory last-active snapshot store.
#[derive(Default)]
pub struct MemoryLastActiveStore {
    map: Mutex<Option<BTreeMap<PublicKey, u64>>>,
}

impl MemoryLastActiveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LastActiveStore for MemoryLastActiveStore {
    fn save(&self, last_active: &BTreeMap<PublicKey, u64>) -> Result<(), StoreError> {
        *self.map.lock().unwrap() = Some(last_active.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<BTreeMap<PublicKey, u64>>, StoreError> {
        Ok(self.map.lock().unwrap().clone())
    }
}

/// An in-memory whitelist snapshot store.
#[derive(Default)]
pub struct MemoryWhitelistStore {
    hashes: Mutex<Option<Vec<Hash256>>>,
}

impl MemoryWhitelistStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WhitelistStore for MemoryWhitelistStore {
    fn save(&self, hashes: &[Hash256]) -> Result<(), StoreError> {
        *self.hashes.lock().unwrap() = Some(hashes.to_vec());
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<Hash256>>, StoreError> {
        Ok(self.hashes.lock().unwrap().clone())
    }
}
