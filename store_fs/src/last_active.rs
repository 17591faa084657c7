//! `last_active.json` — per-member last-seen times, `{ pubkey-hex: seconds }`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::snapshot::{read_json, write_json_atomic};
use rondo_store::{LastActiveStore, StoreError};
use rondo_types::PublicKey;

/// File-backed [`LastActiveStore`].
pub struct JsonLastActiveStore {
    path: PathBuf,
}

impl JsonLastActiveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LastActiveStore for JsonLastActiveStore {
    fn save(&self, last_active: &BTreeMap<PublicKey, u64>) -> Result<(), StoreError> {
        let by_hex: BTreeMap<String, u64> = last_active
            .iter()
            .map(|(key, secs)| (key.to_hex(), *secs))
            .collect();
        write_json_atomic(&self.path, &by_hex).map_err(StoreError::from)
    }

    fn load(&self) -> Result<Option<BTreeMap<PublicKey, u64>>, StoreError> {
        let Some(by_hex) = read_json::<BTreeMap<String, u64>>(&self.path)? else {
            return Ok(None);
        };
        let mut map = BTreeMap::new();
        for (hex, secs) in by_hex {
            let key = PublicKey::from_hex(&hex).ok_or_else(|| {
                StoreError::Corruption(format!("bad pubkey in last-active snapshot: {hex}"))
            })?;
            map.insert(key, secs);
        }
        Ok(Some(map))
    }
}
