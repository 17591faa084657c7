//! Integration tests exercising the wired node: admin voting → scheduled
//! queue → mined block → poll lifecycle → roster change → event bus, plus
//! file-backed persistence across a restart.

use std::sync::{Arc, Mutex};

use rondo_node::{
    AdminError, GenesisMemberConfig, NodeConfig, NodeEvent, NodeStores, RondoNode, VoteOutcome,
};
use rondo_nullables::{
    MemoryLastActiveStore, MemoryMemberStore, MemoryPollLog, MemoryWhitelistStore, NullClock,
};
use rondo_types::{Block, BlockHash, PoaParams, PublicKey, Timestamp, VotingData};
use rondo_voting::encode_votes_script;

const SLOT_SECS: u64 = 16;
const MAX_REORG: u64 = 4;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn key_hex(byte: u8) -> String {
    PublicKey::new([byte; 32]).to_hex()
}

fn key(byte: u8) -> PublicKey {
    PublicKey::new([byte; 32])
}

fn test_params() -> PoaParams {
    PoaParams {
        slot_duration_secs: SLOT_SECS,
        max_reorg_length: MAX_REORG,
        max_idle_secs: 6 * 60 * 60,
    }
}

/// Config for a three-member federation (K1..K3, K2 optionally multisig),
/// running as K1.
fn test_config(multisig_k2: bool) -> NodeConfig {
    NodeConfig {
        params: test_params(),
        genesis_members: vec![
            GenesisMemberConfig {
                pubkey: key_hex(1),
                multisig: false,
            },
            GenesisMemberConfig {
                pubkey: key_hex(2),
                multisig: multisig_k2,
            },
            GenesisMemberConfig {
                pubkey: key_hex(3),
                multisig: false,
            },
        ],
        own_key: Some(key_hex(1)),
        ..NodeConfig::default()
    }
}

fn memory_stores() -> NodeStores {
    NodeStores {
        poll_log: Box::new(MemoryPollLog::new()),
        members: Box::new(MemoryMemberStore::new()),
        last_active: Box::new(MemoryLastActiveStore::new()),
        whitelist: Box::new(MemoryWhitelistStore::new()),
    }
}

fn memory_node(config: &NodeConfig) -> RondoNode {
    RondoNode::open_with(config, memory_stores(), &NullClock::new(1000)).expect("open node")
}

/// A block produced in `miner_index`'s slot carrying `votes`.
fn make_block(height: u64, miner_index: usize, votes: &[VotingData]) -> Block {
    let outputs = if votes.is_empty() {
        vec![]
    } else {
        vec![encode_votes_script(votes)]
    };
    Block::new(
        BlockHash::new([height as u8; 32]),
        Timestamp::from_secs(SLOT_SECS * miner_index as u64),
        outputs,
    )
}

// ---------------------------------------------------------------------------
// 1. Admin voting through to execution
// ---------------------------------------------------------------------------

#[test]
fn admin_vote_flows_through_to_roster_change() {
    let mut node = memory_node(&test_config(false));
    let seen: Arc<Mutex<Vec<NodeEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    node.subscribe_events(Box::new(move |event| {
        sink.lock().unwrap().push(event.clone());
    }));

    // K1 votes to add KX and mines its own scheduled vote.
    assert_eq!(
        node.vote_add_member(&key_hex(0xAA)).unwrap(),
        VoteOutcome::Scheduled
    );
    let mined = node.take_scheduled_votes();
    assert_eq!(mined.len(), 1);
    node.on_block_connected(&make_block(1, 0, &mined), 1).unwrap();

    // K2 and K3 vote in their own blocks.
    node.on_block_connected(&make_block(2, 1, &mined), 2).unwrap();
    node.on_block_connected(&make_block(3, 2, &mined), 3).unwrap();

    // The majority of {K1, K2} is recognized while connecting block 3;
    // execution follows MAX_REORG blocks later.
    for height in 4..=7 {
        node.on_block_connected(&make_block(height, (height % 3) as usize, &[]), height)
            .unwrap();
    }

    let executed = node.executed_polls();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].poll_applied_height, Some(3));
    assert_eq!(executed[0].executed_height, Some(7));

    let members: Vec<PublicKey> = node.members().iter().map(|m| m.pubkey).collect();
    assert_eq!(members, vec![key(1), key(2), key(3), key(0xAA)]);
    assert_eq!(node.members_at(6).len(), 3);
    assert_eq!(node.members_at(7).len(), 4);

    // The member event was published before the block event of height 7.
    let events = seen.lock().unwrap();
    let added_at = events
        .iter()
        .position(|e| matches!(e, NodeEvent::MemberAdded { member } if member.pubkey == key(0xAA)))
        .expect("MemberAdded published");
    let block7_at = events
        .iter()
        .position(|e| matches!(e, NodeEvent::BlockConnected { height: 7, .. }))
        .expect("BlockConnected(7) published");
    assert!(added_at < block7_at);
}

#[test]
fn duplicate_admin_vote_is_a_soft_outcome() {
    let node = memory_node(&test_config(false));
    assert_eq!(
        node.vote_whitelist_hash(&"ab".repeat(32)).unwrap(),
        VoteOutcome::Scheduled
    );
    assert_eq!(
        node.vote_whitelist_hash(&"ab".repeat(32)).unwrap(),
        VoteOutcome::AlreadyVoted
    );
    assert_eq!(node.scheduled_votes().len(), 1);
}

// ---------------------------------------------------------------------------
// 2. Admin validation
// ---------------------------------------------------------------------------

#[test]
fn kicking_a_multisig_member_is_rejected_with_stable_message() {
    let node = memory_node(&test_config(true));
    let err = node.vote_kick_member(&key_hex(2)).unwrap_err();
    match err {
        AdminError::Validation(msg) => {
            assert_eq!(msg, "Multisig members can't be voted on");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(node.scheduled_votes().is_empty());
}

#[test]
fn adding_a_multisig_member_is_rejected_too() {
    let node = memory_node(&test_config(true));
    let err = node.vote_add_member(&key_hex(2)).unwrap_err();
    assert!(matches!(err, AdminError::Validation(msg) if msg == "Multisig members can't be voted on"));
}

#[test]
fn malformed_hex_is_a_validation_error() {
    let node = memory_node(&test_config(false));
    assert!(matches!(
        node.vote_add_member("zz"),
        Err(AdminError::Validation(_))
    ));
    assert!(matches!(
        node.vote_kick_member("1234"),
        Err(AdminError::Validation(_))
    ));
    assert!(matches!(
        node.vote_whitelist_hash("deadbeef"),
        Err(AdminError::Validation(_))
    ));
    assert!(node.scheduled_votes().is_empty());
}

#[test]
fn kicking_an_unknown_member_is_a_validation_error() {
    let node = memory_node(&test_config(false));
    assert!(matches!(
        node.vote_kick_member(&key_hex(0x77)),
        Err(AdminError::Validation(_))
    ));
}

// ---------------------------------------------------------------------------
// 3. File-backed persistence across restart
// ---------------------------------------------------------------------------

#[test]
fn file_backed_node_recovers_state_after_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = test_config(false);
    config.data_dir = dir.path().to_path_buf();

    let vote = {
        let node = RondoNode::open(&config).expect("open node");
        node.vote_add_member(&key_hex(0xAA)).unwrap();
        let mined = node.take_scheduled_votes();
        node.on_block_connected(&make_block(1, 0, &mined), 1).unwrap();
        node.on_block_connected(&make_block(2, 1, &mined), 2).unwrap();
        mined
    };

    // "Restart": reopen over the same data dir and keep going.
    let node = RondoNode::open(&config).expect("reopen node");
    let pending = node.pending_polls();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].votes_in_favor, vec![key(1), key(2)]);

    node.on_block_connected(&make_block(3, 2, &vote), 3).unwrap();
    for height in 4..=7 {
        node.on_block_connected(&make_block(height, (height % 3) as usize, &[]), height)
            .unwrap();
    }
    assert_eq!(node.members().len(), 4);
    assert_eq!(node.executed_polls().len(), 1);

    // The snapshots mandated by the persisted layout are all on disk.
    assert!(dir.path().join("polls.log").exists());
    assert!(dir.path().join("federation.json").exists());
    assert!(dir.path().join("last_active.json").exists());
}

// ---------------------------------------------------------------------------
// 4. Reorg through the node surface
// ---------------------------------------------------------------------------

#[test]
fn disconnects_unwind_roster_and_emit_kick_event() {
    let mut node = memory_node(&test_config(false));
    let seen: Arc<Mutex<Vec<NodeEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    node.subscribe_events(Box::new(move |event| {
        sink.lock().unwrap().push(event.clone());
    }));

    node.vote_add_member(&key_hex(0xAA)).unwrap();
    let mined = node.take_scheduled_votes();
    // Votes at heights 1-3; approval at 3; execution at 3 + MAX_REORG = 7.
    let blocks: Vec<(u64, Block)> = (1..=7)
        .map(|height| {
            let votes = if height <= 3 { mined.clone() } else { vec![] };
            let miner = if height <= 3 {
                (height - 1) as usize
            } else {
                (height % 3) as usize
            };
            (height, make_block(height, miner, &votes))
        })
        .collect();
    for (height, block) in &blocks {
        node.on_block_connected(block, *height).unwrap();
    }
    assert_eq!(node.members().len(), 4);

    let (height, block) = &blocks[6];
    node.on_block_disconnected(block, *height).unwrap();
    assert_eq!(node.members().len(), 3);
    assert_eq!(node.approved_polls().len(), 1);

    let events = seen.lock().unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, NodeEvent::MemberKicked { member } if member.pubkey == key(0xAA))));
    assert!(events
        .iter()
        .any(|e| matches!(e, NodeEvent::BlockDisconnected { height: 7, .. })));
}
