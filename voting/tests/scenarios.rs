//! End-to-end poll lifecycle scenarios: majority approval, delayed execution,
//! duplicate scheduling, whitelist round-trips, and reorg reversal down to
//! poll deletion.

use rondo_federation::FederationManager;
use rondo_nullables::{MemoryMemberStore, MemoryPollLog, MemoryWhitelistStore};
use rondo_types::{
    Block, BlockHash, FederationMember, Hash256, PoaParams, PublicKey, Timestamp, VotingData,
};
use rondo_voting::{encode_votes_script, VotingError, VotingManager, WhitelistRepository};

const SLOT_SECS: u64 = 16;
const MAX_REORG: u64 = 4;

fn params() -> PoaParams {
    PoaParams {
        slot_duration_secs: SLOT_SECS,
        max_reorg_length: MAX_REORG,
        max_idle_secs: 6 * 60 * 60,
    }
}

fn key(byte: u8) -> PublicKey {
    PublicKey::new([byte; 32])
}

fn member(byte: u8) -> FederationMember {
    FederationMember::new(key(byte))
}

struct Harness {
    federation: FederationManager,
    whitelist: WhitelistRepository,
    voting: VotingManager,
}

impl Harness {
    fn new(genesis: Vec<FederationMember>, own_key: Option<PublicKey>) -> Self {
        let federation = FederationManager::load(
            genesis.clone(),
            own_key,
            Box::new(MemoryMemberStore::new()),
        )
        .unwrap();
        let whitelist = WhitelistRepository::load(Box::new(MemoryWhitelistStore::new())).unwrap();
        let voting = VotingManager::load(params(), genesis, Box::new(MemoryPollLog::new())).unwrap();
        Self {
            federation,
            whitelist,
            voting,
        }
    }

    /// A block whose header time puts `miner_index` (into the current roster)
    /// in the producing slot.
    fn block(&self, height: u64, miner_index: usize, votes: &[VotingData]) -> Block {
        let time = Timestamp::from_secs(SLOT_SECS * miner_index as u64);
        let outputs = if votes.is_empty() {
            vec![]
        } else {
            vec![encode_votes_script(votes)]
        };
        Block::new(BlockHash::new([height as u8; 32]), time, outputs)
    }

    fn connect(&mut self, height: u64, miner_index: usize, votes: &[VotingData]) {
        let block = self.block(height, miner_index, votes);
        self.voting
            .on_block_connected(&block, height, &mut self.federation, &mut self.whitelist)
            .unwrap();
    }

    fn disconnect(&mut self, height: u64, miner_index: usize, votes: &[VotingData]) {
        let block = self.block(height, miner_index, votes);
        self.voting
            .on_block_disconnected(&block, height, &mut self.federation, &mut self.whitelist)
            .unwrap();
    }

    fn roster_keys(&self) -> Vec<PublicKey> {
        self.federation.members().iter().map(|m| m.pubkey).collect()
    }
}

/// Scenario: three members vote in a new member; the poll is approved once a
/// majority is visible and executed exactly `MAX_REORG` blocks later.
#[test]
fn add_member_via_majority() {
    let mut h = Harness::new(vec![member(1), member(2), member(3)], None);
    let kx = member(0xAA);
    let vote = VotingData::add_member(&kx);

    h.connect(1, 0, &[vote.clone()]); // K1's vote opens the poll
    h.connect(2, 0, &[vote.clone()]); // K1 again: silently ignored
    assert_eq!(h.voting.pending_polls()[0].votes_in_favor, vec![key(1)]);

    h.connect(3, 1, &[vote.clone()]); // K2
    h.connect(4, 2, &[vote.clone()]); // K3; majority of {K1,K2} recognized here
    let approved = h.voting.approved_polls();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].poll_applied_height, Some(4));
    assert_eq!(
        approved[0].votes_in_favor,
        vec![key(1), key(2), key(3)]
    );

    for height in 5..=7 {
        h.connect(height, (height % 3) as usize, &[]);
        assert!(h.voting.executed_polls().is_empty());
        assert_eq!(h.federation.member_count(), 3);
    }

    h.connect(8, 2, &[]);
    let executed = h.voting.executed_polls();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].poll_applied_height, Some(4));
    assert_eq!(executed[0].executed_height, Some(8));
    assert_eq!(h.roster_keys(), vec![key(1), key(2), key(3), key(0xAA)]);
    assert_eq!(h.voting.members_at(7).len(), 3);
    assert_eq!(h.voting.members_at(8).len(), 4);
}

/// Scenario: double-scheduling the same vote is rejected; mining drains the
/// queue into a single pending poll.
#[test]
fn double_schedule_is_rejected() {
    let mut h = Harness::new(vec![member(1), member(2), member(3)], Some(key(1)));
    let vote = VotingData::add_member(&member(0xAA));

    h.voting.schedule_vote(vote.clone(), &h.federation).unwrap();
    let second = h.voting.schedule_vote(vote.clone(), &h.federation);
    assert!(matches!(second, Err(VotingError::DuplicateVote)));
    assert_eq!(h.voting.scheduled_votes(), vec![vote.clone()]);

    let mined = h.voting.take_scheduled_votes();
    assert_eq!(mined, vec![vote.clone()]);
    h.connect(1, 0, &mined);

    assert!(h.voting.scheduled_votes().is_empty());
    let pending = h.voting.pending_polls();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].votes_in_favor, vec![key(1)]);

    // Having voted on chain, this node still cannot re-schedule.
    let after_mining = h.voting.schedule_vote(vote, &h.federation);
    assert!(matches!(after_mining, Err(VotingError::DuplicateVote)));
}

/// Scenario: a reorg unwinds execution, approval, every vote, and finally the
/// poll itself, height by height.
#[test]
fn reorg_reverses_execution_down_to_deletion() {
    let mut h = Harness::new(vec![member(1), member(2), member(3)], None);
    let kx = member(0xAA);
    let vote = VotingData::add_member(&kx);

    h.connect(1, 0, &[vote.clone()]);
    h.connect(2, 0, &[vote.clone()]);
    h.connect(3, 1, &[vote.clone()]);
    h.connect(4, 2, &[vote.clone()]);
    for height in 5..=8 {
        h.connect(height, (height % 3) as usize, &[]);
    }
    assert_eq!(h.federation.member_count(), 4);

    // (8) execution reverted, roster shrinks, poll back to Approved.
    h.disconnect(8, 2, &[]);
    assert_eq!(h.roster_keys(), vec![key(1), key(2), key(3)]);
    let approved = h.voting.approved_polls();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].poll_applied_height, Some(4));

    // (7)–(5): no change.
    for height in (5..=7).rev() {
        h.disconnect(height, (height % 3) as usize, &[]);
        assert_eq!(h.voting.approved_polls().len(), 1);
        assert_eq!(h.federation.member_count(), 3);
    }

    // (4) approval reverted and K3's vote removed.
    h.disconnect(4, 2, &[vote.clone()]);
    let pending = h.voting.pending_polls();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].votes_in_favor, vec![key(1), key(2)]);

    // (3) K2's vote removed.
    h.disconnect(3, 1, &[vote.clone()]);
    assert_eq!(h.voting.pending_polls()[0].votes_in_favor, vec![key(1)]);

    // (2) duplicate-vote block: nothing changes.
    h.disconnect(2, 0, &[vote.clone()]);
    assert_eq!(h.voting.pending_polls()[0].votes_in_favor, vec![key(1)]);

    // (1) the poll is deleted entirely.
    h.disconnect(1, 0, &[vote.clone()]);
    assert!(h.voting.pending_polls().is_empty());
    assert!(h.voting.approved_polls().is_empty());
    assert!(h.voting.executed_polls().is_empty());
}

/// Scenario: whitelist add and remove round-trip through two majorities.
#[test]
fn whitelist_add_remove_roundtrip() {
    let mut h = Harness::new(vec![member(1), member(2)], None);
    let hash = Hash256::new([0xCC; 32]);

    let add = VotingData::whitelist_hash(hash);
    h.connect(1, 0, &[add.clone()]);
    h.connect(2, 1, &[add]);
    // Majority recognized at 3, executed at 3 + MAX_REORG.
    for height in 3..=7 {
        h.connect(height, (height % 2) as usize, &[]);
    }
    assert!(h.whitelist.contains(&hash));
    assert_eq!(h.whitelist.hashes(), &[hash]);

    let remove = VotingData::remove_hash(hash);
    h.connect(8, 0, &[remove.clone()]);
    h.connect(9, 1, &[remove]);
    for height in 10..=14 {
        h.connect(height, (height % 2) as usize, &[]);
    }
    assert!(!h.whitelist.contains(&hash));
    assert!(h.whitelist.hashes().is_empty());
}

/// Polls approved in the same block execute in approval order; members join
/// the roster in that order.
#[test]
fn same_block_approvals_execute_in_order() {
    let mut h = Harness::new(vec![member(1), member(2), member(3)], None);
    let ka = VotingData::add_member(&member(0xAA));
    let kb = VotingData::add_member(&member(0xBB));

    h.connect(1, 0, &[ka.clone(), kb.clone()]);
    h.connect(2, 1, &[ka, kb]);
    h.connect(3, 2, &[]); // both polls reach majority; approved here
    let approved = h.voting.approved_polls();
    assert_eq!(approved.len(), 2);
    assert!(approved.iter().all(|p| p.poll_applied_height == Some(3)));

    for height in 4..=7 {
        h.connect(height, (height % 3) as usize, &[]);
    }
    assert_eq!(
        h.roster_keys(),
        vec![key(1), key(2), key(3), key(0xAA), key(0xBB)]
    );
}

/// Approval order follows the coinbase position of each poll's tipping vote,
/// not poll-creation order: when a later block votes for the polls in the
/// opposite order, the poll tipped first finalizes — and executes — first.
#[test]
fn approval_follows_coinbase_order_of_tipping_votes() {
    let mut h = Harness::new(vec![member(1), member(2), member(3)], None);
    let ka = VotingData::add_member(&member(0xAA)); // poll id 0
    let kb = VotingData::add_member(&member(0xBB)); // poll id 1

    h.connect(1, 0, &[ka.clone(), kb.clone()]);
    // K2's coinbase carries the votes in reverse: KB's poll is tipped before
    // KA's even though KA's poll is the older one.
    h.connect(2, 1, &[kb, ka]);
    h.connect(3, 2, &[]);
    let approved = h.voting.approved_polls();
    assert_eq!(approved.len(), 2);
    assert!(approved.iter().all(|p| p.poll_applied_height == Some(3)));

    for height in 4..=7 {
        h.connect(height, (height % 3) as usize, &[]);
    }
    // Executions ran in approval order, so KB joined the roster before KA.
    assert_eq!(
        h.roster_keys(),
        vec![key(1), key(2), key(3), key(0xBB), key(0xAA)]
    );
}

/// Votes targeting multisig members never open polls, even when carried in a
/// block; scheduling one is rejected with the canonical message.
#[test]
fn multisig_member_votes_are_refused() {
    let genesis = vec![member(1), FederationMember::multisig(key(2)), member(3)];
    let mut h = Harness::new(genesis.clone(), Some(key(1)));
    let kick = VotingData::kick_member(&genesis[1]);

    let err = h.voting.schedule_vote(kick.clone(), &h.federation).unwrap_err();
    assert!(matches!(err, VotingError::MultisigMember));
    assert_eq!(err.to_string(), "Multisig members can't be voted on");
    assert!(h.voting.scheduled_votes().is_empty());

    // Block-borne votes for a multisig member are skipped; no poll appears.
    h.connect(1, 0, &[kick]);
    assert!(h.voting.pending_polls().is_empty());
}

/// A crash between blocks loses nothing: a manager replaying the same log
/// resumes with an identical poll image and executes on schedule.
#[test]
fn restart_resumes_from_replayed_log() {
    let log = std::sync::Arc::new(MemoryPollLog::new());
    let genesis = vec![member(1), member(2), member(3)];
    let vote = VotingData::add_member(&member(0xAA));

    let mut federation = FederationManager::load(
        genesis.clone(),
        None,
        Box::new(MemoryMemberStore::new()),
    )
    .unwrap();
    let mut whitelist = WhitelistRepository::load(Box::new(MemoryWhitelistStore::new())).unwrap();

    let mut voting = VotingManager::load(
        params(),
        genesis.clone(),
        Box::new(std::sync::Arc::clone(&log)),
    )
    .unwrap();
    for (height, miner) in [(1u64, 0usize), (2, 1), (3, 2)] {
        let block = Block::new(
            BlockHash::new([height as u8; 32]),
            Timestamp::from_secs(SLOT_SECS * miner as u64),
            vec![encode_votes_script(&[vote.clone()])],
        );
        voting
            .on_block_connected(&block, height, &mut federation, &mut whitelist)
            .unwrap();
    }
    let before = (
        voting.pending_polls(),
        voting.approved_polls(),
        voting.executed_polls(),
    );
    drop(voting);

    // "Restart": a fresh manager over the same log.
    let voting =
        VotingManager::load(params(), genesis, Box::new(std::sync::Arc::clone(&log))).unwrap();
    let after = (
        voting.pending_polls(),
        voting.approved_polls(),
        voting.executed_polls(),
    );
    assert_eq!(before, after);
}
