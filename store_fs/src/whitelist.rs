//! `whitelist.json` — ordered set of whitelisted hashes, stored as hex.

use std::path::PathBuf;

use crate::snapshot::{read_json, write_json_atomic};
use rondo_store::{StoreError, WhitelistStore};
use rondo_types::Hash256;

/// File-backed [`WhitelistStore`].
pub struct JsonWhitelistStore {
    path: PathBuf,
}

impl JsonWhitelistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WhitelistStore for JsonWhitelistStore {
    fn save(&self, hashes: &[Hash256]) -> Result<(), StoreError> {
        let by_hex: Vec<String> = hashes.iter().map(|h| h.to_hex()).collect();
        write_json_atomic(&self.path, &by_hex).map_err(StoreError::from)
    }

    fn load(&self) -> Result<Option<Vec<Hash256>>, StoreError> {
        let Some(by_hex) = read_json::<Vec<String>>(&self.path)? else {
            return Ok(None);
        };
        let mut hashes = Vec::with_capacity(by_hex.len());
        for hex in by_hex {
            let hash = Hash256::from_hex(&hex).ok_or_else(|| {
                StoreError::Corruption(format!("bad hash in whitelist snapshot: {hex}"))
            })?;
            hashes.push(hash);
        }
        Ok(Some(hashes))
    }
}
