//! Append-only, framed poll log.
//!
//! Record framing: `len:u32-le | checksum:u32-le | body`, where `body` is the
//! bincode encoding of a [`PollLogRecord`] and `checksum` is the first four
//! bytes of the BLAKE2s-256 digest of `body`.
//!
//! A torn final frame (crash mid-append) is detected during replay, logged and
//! truncated away. A bad frame anywhere earlier means the file is corrupt and
//! replay fails — the node must not start from a diverged image.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use blake2::{Blake2s256, Digest};

use crate::FsError;
use rondo_store::{PollLog, StoreError};
use rondo_types::PollLogRecord;

const FRAME_HEADER_LEN: usize = 8;

fn checksum(body: &[u8]) -> u32 {
    let digest = Blake2s256::digest(body);
    u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// File-backed [`PollLog`].
pub struct FilePollLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl FilePollLog {
    /// Open (or create) the log at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, FsError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    fn lock_file(&self) -> Result<std::sync::MutexGuard<'_, File>, StoreError> {
        self.file
            .lock()
            .map_err(|_| StoreError::Backend("poll log lock poisoned".into()))
    }

    /// Drop everything at and after `offset` (torn-tail recovery).
    fn truncate_to(&self, offset: u64) -> Result<(), StoreError> {
        let file = self.lock_file()?;
        file.set_len(offset)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl PollLog for FilePollLog {
    fn append(&self, record: &PollLogRecord) -> Result<(), StoreError> {
        let body =
            bincode::serialize(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + body.len());
        frame.extend_from_slice(&(body.len() as u32).to_le_bytes());
        frame.extend_from_slice(&checksum(&body).to_le_bytes());
        frame.extend_from_slice(&body);

        let mut file = self.lock_file()?;
        file.write_all(&frame)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        file.sync_data()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn replay(&self) -> Result<Vec<PollLogRecord>, StoreError> {
        let bytes = std::fs::read(&self.path).map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut records = Vec::new();
        let mut offset = 0usize;

        while offset < bytes.len() {
            let remaining = &bytes[offset..];
            let frame = match decode_frame(remaining) {
                Ok(frame) => frame,
                Err(FrameError::Torn) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        offset,
                        "truncating torn record at end of poll log"
                    );
                    self.truncate_to(offset as u64)?;
                    break;
                }
                Err(FrameError::Bad(reason)) => {
                    // A size-complete frame that fails validation was fully
                    // written and later damaged; not recoverable.
                    return Err(StoreError::Corruption(format!(
                        "poll log record at offset {}: {}",
                        offset, reason
                    )));
                }
            };
            records.push(frame.record);
            offset += frame.consumed;
        }

        Ok(records)
    }
}

struct DecodedFrame {
    record: PollLogRecord,
    consumed: usize,
}

enum FrameError {
    /// The frame runs past end-of-file: a crash interrupted the append.
    Torn,
    /// The frame is complete but invalid.
    Bad(String),
}

fn decode_frame(bytes: &[u8]) -> Result<DecodedFrame, FrameError> {
    if bytes.len() < FRAME_HEADER_LEN {
        return Err(FrameError::Torn);
    }
    let len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let expected_checksum = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if bytes.len() < FRAME_HEADER_LEN + len {
        return Err(FrameError::Torn);
    }
    let body = &bytes[FRAME_HEADER_LEN..FRAME_HEADER_LEN + len];
    if checksum(body) != expected_checksum {
        return Err(FrameError::Bad("checksum mismatch".into()));
    }
    let record: PollLogRecord =
        bincode::deserialize(body).map_err(|e| FrameError::Bad(e.to_string()))?;
    Ok(DecodedFrame {
        record,
        consumed: FRAME_HEADER_LEN + len,
    })
}
