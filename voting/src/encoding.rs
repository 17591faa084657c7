//! Wire format for votes embedded in coinbase outputs.
//!
//! The block producer drains its scheduled votes into one distinguished
//! coinbase output: `OP_RETURN <magic> <entries>`, where each entry is
//! `key:u8 | payload_len:varint | payload`. The varint is Bitcoin
//! CompactSize. Extraction is a pure function of the block and must produce
//! identical results on every node.
//!
//! Forward compatibility: an entry with an unrecognized key byte is skipped
//! with a warning and extraction continues. A structurally malformed tail
//! (truncated length or payload) aborts extraction of that output; the block
//! itself stays valid either way.

use rondo_types::{Block, VoteKey, VotingData};

const OP_RETURN: u8 = 0x6a;

/// Magic marking a coinbase output as a voting-data carrier.
const VOTING_MAGIC: [u8; 4] = [0x52, 0x4e, 0x44, 0x56]; // "RNDV"

/// Length of the `OP_RETURN <magic>` prefix.
pub const VOTING_OUTPUT_PREFIX_LEN: usize = 1 + VOTING_MAGIC.len();

fn write_compact_size(out: &mut Vec<u8>, value: u64) {
    match value {
        0..=0xfc => out.push(value as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(value as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(value as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
}

fn read_compact_size(bytes: &[u8], cursor: &mut usize) -> Option<u64> {
    let first = *bytes.get(*cursor)?;
    *cursor += 1;
    let width = match first {
        0..=0xfc => return Some(first as u64),
        0xfd => 2,
        0xfe => 4,
        _ => 8,
    };
    let slice = bytes.get(*cursor..*cursor + width)?;
    *cursor += width;
    let mut buf = [0u8; 8];
    buf[..width].copy_from_slice(slice);
    Some(u64::from_le_bytes(buf))
}

/// Encode scheduled votes into the distinguished coinbase output script.
pub fn encode_votes_script(votes: &[VotingData]) -> Vec<u8> {
    let mut script = Vec::with_capacity(
        VOTING_OUTPUT_PREFIX_LEN + votes.iter().map(|v| 10 + v.payload.len()).sum::<usize>(),
    );
    script.push(OP_RETURN);
    script.extend_from_slice(&VOTING_MAGIC);
    for vote in votes {
        script.push(vote.key.as_u8());
        write_compact_size(&mut script, vote.payload.len() as u64);
        script.extend_from_slice(&vote.payload);
    }
    script
}

/// Decode one voting output. Entries with unknown keys are skipped; a
/// malformed tail ends decoding of this output.
fn decode_votes_script(script: &[u8]) -> Vec<VotingData> {
    let mut votes = Vec::new();
    let mut cursor = VOTING_OUTPUT_PREFIX_LEN;

    while cursor < script.len() {
        let key_byte = script[cursor];
        cursor += 1;
        let Some(len) = read_compact_size(script, &mut cursor) else {
            tracing::warn!(offset = cursor, "truncated vote entry in coinbase output");
            break;
        };
        let Some(payload) = script.get(cursor..cursor + len as usize) else {
            tracing::warn!(offset = cursor, "vote payload runs past end of output");
            break;
        };
        cursor += len as usize;

        match VoteKey::from_u8(key_byte) {
            Some(key) => votes.push(VotingData {
                key,
                payload: payload.to_vec(),
            }),
            None => {
                tracing::warn!(key = key_byte, "skipping vote with unrecognized key byte");
            }
        }
    }

    votes
}

/// Whether an output script carries voting data.
fn is_voting_output(script: &[u8]) -> bool {
    script.len() >= VOTING_OUTPUT_PREFIX_LEN
        && script[0] == OP_RETURN
        && script[1..VOTING_OUTPUT_PREFIX_LEN] == VOTING_MAGIC
}

/// Extract all votes carried by a block's coinbase, in coinbase order.
pub fn extract_votes(block: &Block) -> Vec<VotingData> {
    let mut votes = Vec::new();
    for output in &block.coinbase_outputs {
        if is_voting_output(output) {
            votes.extend(decode_votes_script(output));
        }
    }
    votes
}
