//! Shared helpers for JSON snapshot files: read-if-present, write via
//! temp file + rename so a crash never leaves a half-written snapshot.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::FsError;

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, FsError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let value = serde_json::from_str(&contents)
        .map_err(|e| FsError::Corruption(format!("{}: {}", path.display(), e)))?;
    Ok(Some(value))
}

pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), FsError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| FsError::Serialization(e.to_string()))?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
