//! `federation.json` — roster snapshot store.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::snapshot::{read_json, write_json_atomic};
use rondo_store::{MemberStore, StoreError};
use rondo_types::{FederationMember, PublicKey};

/// On-disk member record; pubkeys are stored as hex for operator legibility.
#[derive(Serialize, Deserialize)]
struct MemberRecord {
    pubkey: String,
    #[serde(default)]
    multisig: bool,
}

/// File-backed [`MemberStore`] writing the roster as a JSON array.
pub struct JsonMemberStore {
    path: PathBuf,
}

impl JsonMemberStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MemberStore for JsonMemberStore {
    fn save(&self, members: &[FederationMember]) -> Result<(), StoreError> {
        let records: Vec<MemberRecord> = members
            .iter()
            .map(|m| MemberRecord {
                pubkey: m.pubkey.to_hex(),
                multisig: m.is_multisig,
            })
            .collect();
        write_json_atomic(&self.path, &records).map_err(StoreError::from)
    }

    fn load(&self) -> Result<Option<Vec<FederationMember>>, StoreError> {
        let Some(records) = read_json::<Vec<MemberRecord>>(&self.path)? else {
            return Ok(None);
        };
        let mut members = Vec::with_capacity(records.len());
        for record in records {
            let pubkey = PublicKey::from_hex(&record.pubkey).ok_or_else(|| {
                StoreError::Corruption(format!("bad pubkey in roster snapshot: {}", record.pubkey))
            })?;
            members.push(FederationMember {
                pubkey,
                is_multisig: record.multisig,
            });
        }
        Ok(Some(members))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_roundtrip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonMemberStore::new(dir.path().join("federation.json"));

        let members = vec![
            FederationMember::multisig(PublicKey::new([3; 32])),
            FederationMember::new(PublicKey::new([1; 32])),
            FederationMember::new(PublicKey::new([2; 32])),
        ];
        store.save(&members).unwrap();
        assert_eq!(store.load().unwrap(), Some(members));
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonMemberStore::new(dir.path().join("federation.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn load_rejects_bad_pubkey() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("federation.json");
        std::fs::write(&path, r#"[{"pubkey": "nothex", "multisig": false}]"#).unwrap();
        let store = JsonMemberStore::new(path);
        assert!(matches!(store.load(), Err(StoreError::Corruption(_))));
    }
}
