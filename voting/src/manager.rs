//! The voting manager: poll aggregation, finalization and execution.
//!
//! Connect-time processing of a block at height `H` runs three passes:
//!
//! 1. **Finalize** — every pending poll whose recorded votes now meet the
//!    majority threshold is marked Approved at `H`. This runs before the
//!    block's own votes are applied, so a vote can never tip its poll in the
//!    block that carries it; the majority is recognized at the next block.
//! 2. **Aggregate** — votes extracted from the coinbase are attributed to the
//!    block's slot holder and folded into polls in coinbase order.
//! 3. **Execute** — every approved poll whose activation delay has elapsed
//!    (`H == poll_applied_height + max_reorg_length`, exactly) commits its
//!    side effect, in approval order.
//!
//! Disconnect-time processing is the exact mirror, in reverse: executions
//! undone, approvals reverted, votes removed, empty polls deleted.
//!
//! Every mutation is appended to the poll log before the in-memory image
//! changes; startup replays the log.

use std::collections::HashMap;

use crate::encoding;
use crate::schedule::ScheduledVotes;
use crate::whitelist::WhitelistRepository;
use crate::VotingError;
use rondo_federation::{slot_holder, FederationManager, RosterEvent};
use rondo_store::PollLog;
use rondo_types::{
    Block, FederationMember, Hash256, PoaParams, Poll, PollLogRecord, PublicKey, VoteKey,
    VotingData,
};

/// Votes required to approve a poll against a roster of `n` members.
fn majority(n: usize) -> usize {
    n / 2 + 1
}

/// Position bookkeeping for one recorded vote.
#[derive(Clone, Copy)]
struct VoteMark {
    /// Height of the block that carried the vote.
    height: u64,
    /// Global arrival index: votes folded earlier have lower values. Within
    /// one block this is coinbase position, which orders same-block
    /// approvals.
    seq: u64,
}

/// A vote's decoded target, after payload validation.
enum VoteTarget {
    Member(FederationMember),
    Hash(Hash256),
}

/// Validate a block-borne vote's payload for its key.
///
/// Returns `None` for votes that must be skipped: undecodable payloads
/// (forward compatibility with richer encodings) and member votes targeting
/// a multisig member, whose polls must never be created.
fn decode_target(vote: &VotingData) -> Option<VoteTarget> {
    if vote.key.targets_member() {
        let Some(member) = vote.member() else {
            tracing::warn!(vote = ?vote, "skipping member vote with non-canonical payload");
            return None;
        };
        if member.is_multisig {
            tracing::warn!(vote = ?vote, "skipping vote targeting a multisig member");
            return None;
        }
        Some(VoteTarget::Member(member))
    } else {
        let Some(hash) = vote.hash() else {
            tracing::warn!(vote = ?vote, "skipping hash vote whose payload is not 32 bytes");
            return None;
        };
        Some(VoteTarget::Hash(hash))
    }
}

/// Aggregates coinbase votes into polls and drives them through
/// Pending → Approved → Executed, tolerating arbitrary reorganizations.
pub struct VotingManager {
    params: PoaParams,
    /// Roster at height zero; the base of `members_at` replay.
    genesis: Vec<FederationMember>,
    /// All live polls in creation order. Executed polls stay until a reorg
    /// deletes them (which only happens past their start height).
    polls: Vec<Poll>,
    /// Poll ids in the order their approvals were recorded; executions and
    /// their reversals follow this order.
    approval_order: Vec<u64>,
    /// Where each (poll, voter) vote arrived: disconnects remove exactly the
    /// votes of the disconnected height, and approval ordering follows the
    /// arrival of tipping votes.
    vote_marks: HashMap<(u64, PublicKey), VoteMark>,
    /// Next value of [`VoteMark::seq`]; advances identically during live
    /// processing and log replay.
    vote_seq: u64,
    next_poll_id: u64,
    scheduled: ScheduledVotes,
    log: Box<dyn PollLog>,
}

impl VotingManager {
    /// Rebuild the in-memory poll image by replaying the persisted log.
    pub fn load(
        params: PoaParams,
        genesis: Vec<FederationMember>,
        log: Box<dyn PollLog>,
    ) -> Result<Self, VotingError> {
        let mut manager = Self {
            params,
            genesis,
            polls: Vec::new(),
            approval_order: Vec::new(),
            vote_marks: HashMap::new(),
            vote_seq: 0,
            next_poll_id: 0,
            scheduled: ScheduledVotes::new(),
            log,
        };
        let records = manager.log.replay()?;
        for record in records {
            manager.apply_replayed(record)?;
        }
        tracing::info!(
            polls = manager.polls.len(),
            next_id = manager.next_poll_id,
            "poll log replayed"
        );
        Ok(manager)
    }

    fn replay_error(detail: impl Into<String>) -> VotingError {
        VotingError::InvariantViolation(format!("poll log replay: {}", detail.into()))
    }

    fn apply_replayed(&mut self, record: PollLogRecord) -> Result<(), VotingError> {
        match record {
            PollLogRecord::Created {
                id,
                data,
                start_height,
                start_hash,
                first_voter,
            } => {
                if self.find_poll(id).is_some() {
                    return Err(Self::replay_error(format!("poll {id} created twice")));
                }
                self.polls
                    .push(Poll::new(id, data, start_height, start_hash, first_voter));
                let mark = self.next_mark(start_height);
                self.vote_marks.insert((id, first_voter), mark);
                self.next_poll_id = self.next_poll_id.max(id + 1);
            }
            PollLogRecord::VoteAdded { id, voter, height } => {
                let poll = self
                    .poll_mut(id)
                    .ok_or_else(|| Self::replay_error(format!("vote for unknown poll {id}")))?;
                if !poll.add_vote(voter) {
                    return Err(Self::replay_error(format!(
                        "duplicate vote recorded for poll {id}"
                    )));
                }
                let mark = self.next_mark(height);
                self.vote_marks.insert((id, voter), mark);
            }
            PollLogRecord::VoteRemoved { id, voter } => {
                let poll = self
                    .poll_mut(id)
                    .ok_or_else(|| Self::replay_error(format!("removal for unknown poll {id}")))?;
                if !poll.remove_vote(&voter) {
                    return Err(Self::replay_error(format!(
                        "removal of absent vote on poll {id}"
                    )));
                }
                self.vote_marks.remove(&(id, voter));
            }
            PollLogRecord::Approved { id, height } => {
                let poll = self
                    .poll_mut(id)
                    .ok_or_else(|| Self::replay_error(format!("approval of unknown poll {id}")))?;
                if !poll.is_pending() {
                    return Err(Self::replay_error(format!("poll {id} approved twice")));
                }
                poll.poll_applied_height = Some(height);
                self.approval_order.push(id);
            }
            PollLogRecord::ApprovalReverted { id } => {
                let poll = self.poll_mut(id).ok_or_else(|| {
                    Self::replay_error(format!("approval revert of unknown poll {id}"))
                })?;
                if !poll.is_approved() {
                    return Err(Self::replay_error(format!("poll {id} not approved")));
                }
                poll.poll_applied_height = None;
                self.approval_order.retain(|other| *other != id);
            }
            PollLogRecord::Executed { id, height } => {
                let poll = self
                    .poll_mut(id)
                    .ok_or_else(|| Self::replay_error(format!("execution of unknown poll {id}")))?;
                if !poll.is_approved() {
                    return Err(Self::replay_error(format!("poll {id} not executable")));
                }
                poll.executed_height = Some(height);
            }
            PollLogRecord::ExecutionReverted { id } => {
                let poll = self.poll_mut(id).ok_or_else(|| {
                    Self::replay_error(format!("execution revert of unknown poll {id}"))
                })?;
                if !poll.is_executed() {
                    return Err(Self::replay_error(format!("poll {id} not executed")));
                }
                poll.executed_height = None;
            }
            PollLogRecord::Deleted { id } => {
                if self.find_poll(id).is_none() {
                    return Err(Self::replay_error(format!("deletion of unknown poll {id}")));
                }
                self.polls.retain(|p| p.id != id);
                self.approval_order.retain(|other| *other != id);
                self.vote_marks.retain(|(poll_id, _), _| *poll_id != id);
            }
        }
        Ok(())
    }

    fn find_poll(&self, id: u64) -> Option<&Poll> {
        self.polls.iter().find(|p| p.id == id)
    }

    fn poll_mut(&mut self, id: u64) -> Option<&mut Poll> {
        self.polls.iter_mut().find(|p| p.id == id)
    }

    fn next_mark(&mut self, height: u64) -> VoteMark {
        let seq = self.vote_seq;
        self.vote_seq += 1;
        VoteMark { height, seq }
    }

    /// Arrival index of the poll's newest surviving vote — the vote that
    /// tipped it, for a poll that just crossed the threshold.
    fn newest_vote_seq(&self, poll: &Poll) -> u64 {
        poll.votes_in_favor
            .iter()
            .filter_map(|voter| self.vote_marks.get(&(poll.id, *voter)))
            .map(|mark| mark.seq)
            .max()
            .unwrap_or(0)
    }

    // ── Scheduled votes ────────────────────────────────────────────────

    /// Queue a vote for inclusion in the next block this node produces.
    ///
    /// Rejects votes targeting multisig members, votes with undecodable
    /// payloads, and duplicates — a vote identical to one already queued or
    /// already cast by this node in any live poll.
    pub fn schedule_vote(
        &self,
        vote: VotingData,
        federation: &FederationManager,
    ) -> Result<(), VotingError> {
        if vote.key.targets_member() {
            let member = vote
                .member()
                .ok_or_else(|| VotingError::InvalidVote("not a canonical member payload".into()))?;
            if member.is_multisig {
                return Err(VotingError::MultisigMember);
            }
        } else if vote.hash().is_none() {
            return Err(VotingError::InvalidVote(
                "payload is not a 32-byte digest".into(),
            ));
        }

        if let Some(own_key) = federation.current_key() {
            let already_voted = self
                .polls
                .iter()
                .any(|poll| poll.data == vote && poll.has_voted(&own_key));
            if already_voted {
                return Err(VotingError::DuplicateVote);
            }
        }

        if !self.scheduled.push_unique(vote) {
            return Err(VotingError::DuplicateVote);
        }
        Ok(())
    }

    /// Snapshot of queued votes, oldest first.
    pub fn scheduled_votes(&self) -> Vec<VotingData> {
        self.scheduled.snapshot()
    }

    /// Drain the queue for the block producer; called once per produced block.
    pub fn take_scheduled_votes(&self) -> Vec<VotingData> {
        self.scheduled.drain()
    }

    // ── Poll queries ───────────────────────────────────────────────────

    pub fn pending_polls(&self) -> Vec<Poll> {
        self.polls.iter().filter(|p| p.is_pending()).cloned().collect()
    }

    pub fn approved_polls(&self) -> Vec<Poll> {
        self.polls.iter().filter(|p| p.is_approved()).cloned().collect()
    }

    pub fn executed_polls(&self) -> Vec<Poll> {
        self.polls.iter().filter(|p| p.is_executed()).cloned().collect()
    }

    /// Whether this node's key is already behind `vote`, either queued or
    /// recorded in a live poll. The idle kicker consults this before
    /// scheduling kicks.
    pub fn has_voted_or_scheduled(&self, own_key: &PublicKey, vote: &VotingData) -> bool {
        self.scheduled.contains(vote)
            || self
                .polls
                .iter()
                .any(|poll| poll.data == *vote && poll.has_voted(own_key))
    }

    // ── Historical roster replay ───────────────────────────────────────

    /// Poll ids of executed polls, in execution order: by executed height,
    /// and within a height by approval order.
    fn execution_sequence(&self) -> Vec<u64> {
        let mut sequence: Vec<(u64, usize)> = Vec::new();
        for (approval_index, id) in self.approval_order.iter().enumerate() {
            if let Some(poll) = self.find_poll(*id) {
                if let Some(executed) = poll.executed_height {
                    sequence.push((executed, approval_index));
                }
            }
        }
        sequence.sort();
        sequence
            .into_iter()
            .map(|(_, approval_index)| self.approval_order[approval_index])
            .collect()
    }

    fn apply_member_effect(roster: &mut Vec<FederationMember>, poll: &Poll) {
        let Some(member) = poll.data.member() else {
            return;
        };
        match poll.data.key {
            VoteKey::AddMember => {
                if !roster.iter().any(|m| m.pubkey == member.pubkey) {
                    roster.push(member);
                }
            }
            VoteKey::KickMember => {
                roster.retain(|m| m.pubkey != member.pubkey);
            }
            _ => {}
        }
    }

    /// The federation roster as it stood at `height`, rebuilt by replaying
    /// poll executions up to and including that height. Used by block
    /// validation to identify the slot holder of historical blocks.
    pub fn members_at(&self, height: u64) -> Vec<FederationMember> {
        let mut roster = self.genesis.clone();
        for id in self.execution_sequence() {
            let Some(poll) = self.find_poll(id) else {
                continue;
            };
            match poll.executed_height {
                Some(executed) if executed <= height => {
                    Self::apply_member_effect(&mut roster, poll)
                }
                _ => {}
            }
        }
        roster
    }

    /// The roster just before `poll_id`'s own execution, with every earlier
    /// execution applied. Reversal uses this to restore a kicked member to
    /// its original slot position.
    fn roster_before_execution(&self, poll_id: u64) -> Vec<FederationMember> {
        let mut roster = self.genesis.clone();
        for id in self.execution_sequence() {
            if id == poll_id {
                break;
            }
            if let Some(poll) = self.find_poll(id) {
                Self::apply_member_effect(&mut roster, poll);
            }
        }
        roster
    }

    /// The whitelist just before `poll_id`'s own execution.
    fn whitelist_before_execution(&self, poll_id: u64) -> Vec<Hash256> {
        let mut hashes: Vec<Hash256> = Vec::new();
        for id in self.execution_sequence() {
            if id == poll_id {
                break;
            }
            let Some(poll) = self.find_poll(id) else {
                continue;
            };
            let Some(hash) = poll.data.hash() else {
                continue;
            };
            match poll.data.key {
                VoteKey::WhitelistHash => {
                    if !hashes.contains(&hash) {
                        hashes.push(hash);
                    }
                }
                VoteKey::RemoveHash => hashes.retain(|h| *h != hash),
                _ => {}
            }
        }
        hashes
    }

    // ── Block connect ──────────────────────────────────────────────────

    /// Process a connected block. Returns the roster events produced by poll
    /// executions, for publication after this call completes.
    pub fn on_block_connected(
        &mut self,
        block: &Block,
        height: u64,
        federation: &mut FederationManager,
        whitelist: &mut WhitelistRepository,
    ) -> Result<Vec<RosterEvent>, VotingError> {
        self.finalize_pending(height, federation)?;

        let votes = encoding::extract_votes(block);
        if !votes.is_empty() {
            let miner = slot_holder(
                federation.members(),
                block.header.time,
                self.params.slot_duration_secs,
            )
            .ok_or_else(|| {
                VotingError::InvariantViolation(
                    "block carries votes but the roster has no slot holder".into(),
                )
            })?;
            for vote in votes {
                self.apply_vote(vote, miner.pubkey, height, block)?;
            }
        }

        self.execute_due_polls(height, federation, whitelist)
    }

    /// Mark every pending poll that meets the majority threshold as Approved
    /// at `height`. Only votes from current roster members count; the
    /// threshold is taken against the roster size at this block.
    ///
    /// Polls that crossed the threshold in the same block finalize in the
    /// order their tipping votes appeared in that block's coinbase — which
    /// is the arrival order of each poll's newest vote, not poll-creation
    /// order.
    fn finalize_pending(
        &mut self,
        height: u64,
        federation: &FederationManager,
    ) -> Result<(), VotingError> {
        let threshold = majority(federation.member_count());
        let mut to_approve: Vec<(u64, u64)> = self
            .polls
            .iter()
            .filter(|poll| poll.is_pending())
            .filter(|poll| {
                let eligible = poll
                    .votes_in_favor
                    .iter()
                    .filter(|voter| federation.is_member(voter))
                    .count();
                eligible >= threshold
            })
            .map(|poll| (self.newest_vote_seq(poll), poll.id))
            .collect();
        to_approve.sort();

        for (_, id) in to_approve {
            self.log.append(&PollLogRecord::Approved { id, height })?;
            if let Some(poll) = self.poll_mut(id) {
                poll.poll_applied_height = Some(height);
                tracing::info!(poll = id, height, "poll approved by federation majority");
            }
            self.approval_order.push(id);
        }
        Ok(())
    }

    /// Fold one coinbase vote into the poll set.
    fn apply_vote(
        &mut self,
        vote: VotingData,
        voter: PublicKey,
        height: u64,
        block: &Block,
    ) -> Result<(), VotingError> {
        if decode_target(&vote).is_none() {
            return Ok(()); // logged by decode_target
        }

        // Votes aggregate into the newest live (not yet executed) poll for
        // the same data; an executed poll's tally is immutable, so a fresh
        // vote after execution opens a new poll.
        let target = self
            .polls
            .iter()
            .rev()
            .find(|poll| poll.data == vote && !poll.is_executed())
            .map(|poll| poll.id);

        match target {
            Some(id) => {
                let poll = self
                    .find_poll(id)
                    .ok_or_else(|| VotingError::InvariantViolation("poll vanished".into()))?;
                if poll.has_voted(&voter) {
                    tracing::debug!(poll = id, voter = %voter, "ignoring duplicate vote");
                    return Ok(());
                }
                self.log
                    .append(&PollLogRecord::VoteAdded { id, voter, height })?;
                if let Some(poll) = self.poll_mut(id) {
                    poll.add_vote(voter);
                }
                let mark = self.next_mark(height);
                self.vote_marks.insert((id, voter), mark);
                tracing::debug!(poll = id, voter = %voter, height, "vote recorded");
            }
            None => {
                let id = self.next_poll_id;
                self.log.append(&PollLogRecord::Created {
                    id,
                    data: vote.clone(),
                    start_height: height,
                    start_hash: block.hash,
                    first_voter: voter,
                })?;
                self.polls
                    .push(Poll::new(id, vote, height, block.hash, voter));
                let mark = self.next_mark(height);
                self.vote_marks.insert((id, voter), mark);
                self.next_poll_id += 1;
                tracing::info!(poll = id, voter = %voter, height, "poll created");
            }
        }
        Ok(())
    }

    /// Execute every approved poll whose activation delay elapses exactly at
    /// `height`, in approval order.
    fn execute_due_polls(
        &mut self,
        height: u64,
        federation: &mut FederationManager,
        whitelist: &mut WhitelistRepository,
    ) -> Result<Vec<RosterEvent>, VotingError> {
        let due: Vec<u64> = self
            .approval_order
            .iter()
            .copied()
            .filter(|id| {
                self.find_poll(*id).is_some_and(|poll| {
                    poll.is_approved()
                        && poll
                            .poll_applied_height
                            .map(|applied| applied + self.params.max_reorg_length)
                            == Some(height)
                })
            })
            .collect();

        let mut events = Vec::new();
        for id in due {
            self.log.append(&PollLogRecord::Executed { id, height })?;
            let data = self
                .find_poll(id)
                .ok_or_else(|| VotingError::InvariantViolation("poll vanished".into()))?
                .data
                .clone();
            if let Some(event) = self.apply_side_effect(&data, federation, whitelist)? {
                events.push(event);
            }
            if let Some(poll) = self.poll_mut(id) {
                poll.executed_height = Some(height);
            }
            tracing::info!(poll = id, height, "poll executed");
        }
        Ok(events)
    }

    fn apply_side_effect(
        &self,
        data: &VotingData,
        federation: &mut FederationManager,
        whitelist: &mut WhitelistRepository,
    ) -> Result<Option<RosterEvent>, VotingError> {
        let target = decode_target(data).ok_or_else(|| {
            VotingError::InvariantViolation("executed poll carries an invalid target".into())
        })?;
        match (data.key, target) {
            (VoteKey::AddMember, VoteTarget::Member(member)) => {
                Ok(federation.add_member(member)?)
            }
            (VoteKey::KickMember, VoteTarget::Member(member)) => {
                Ok(federation.remove_member(&member)?)
            }
            (VoteKey::WhitelistHash, VoteTarget::Hash(hash)) => {
                whitelist.add(hash)?;
                Ok(None)
            }
            (VoteKey::RemoveHash, VoteTarget::Hash(hash)) => {
                whitelist.remove(&hash)?;
                Ok(None)
            }
            _ => Err(VotingError::InvariantViolation(
                "vote key and payload disagree".into(),
            )),
        }
    }

    // ── Block disconnect ───────────────────────────────────────────────

    /// Unwind a disconnected block: executions first (most recent first),
    /// then approvals, then the block's votes. Polls whose vote set becomes
    /// empty at their start height are deleted entirely.
    pub fn on_block_disconnected(
        &mut self,
        block: &Block,
        height: u64,
        federation: &mut FederationManager,
        whitelist: &mut WhitelistRepository,
    ) -> Result<Vec<RosterEvent>, VotingError> {
        let mut events = Vec::new();

        // 1. Undo executions committed at this height, newest first.
        let executed_here: Vec<u64> = self
            .execution_sequence()
            .into_iter()
            .filter(|id| {
                self.find_poll(*id)
                    .is_some_and(|poll| poll.executed_height == Some(height))
            })
            .collect();
        for id in executed_here.into_iter().rev() {
            self.log.append(&PollLogRecord::ExecutionReverted { id })?;
            events.extend(self.revert_side_effect(id, federation, whitelist)?);
            if let Some(poll) = self.poll_mut(id) {
                poll.executed_height = None;
            }
            tracing::info!(poll = id, height, "poll execution reverted");
        }

        // 2. Revert approvals recorded at this height.
        let approved_here: Vec<u64> = self
            .approval_order
            .iter()
            .copied()
            .filter(|id| {
                self.find_poll(*id)
                    .is_some_and(|poll| poll.poll_applied_height == Some(height))
            })
            .collect();
        for id in approved_here.into_iter().rev() {
            self.log.append(&PollLogRecord::ApprovalReverted { id })?;
            if let Some(poll) = self.poll_mut(id) {
                poll.poll_applied_height = None;
            }
            self.approval_order.retain(|other| *other != id);
            tracing::info!(poll = id, height, "poll approval reverted");
        }

        // The disconnected block's own votes must still be accounted for in
        // the poll set; anything else means the images diverged.
        for vote in encoding::extract_votes(block) {
            if decode_target(&vote).is_none() {
                continue;
            }
            if !self.polls.iter().any(|poll| poll.data == vote) {
                return Err(VotingError::InvariantViolation(format!(
                    "disconnected block at height {height} carries {vote:?} but no such poll exists"
                )));
            }
        }

        // 3. Remove the votes recorded at this height, newest poll first;
        // delete polls that become empty at their start height.
        let mut deleted: Vec<u64> = Vec::new();
        let poll_ids: Vec<u64> = self.polls.iter().map(|poll| poll.id).rev().collect();
        for id in poll_ids {
            let Some(poll) = self.find_poll(id) else {
                continue;
            };
            let to_remove: Vec<PublicKey> = poll
                .votes_in_favor
                .iter()
                .rev()
                .filter(|voter| {
                    self.vote_marks
                        .get(&(id, **voter))
                        .is_some_and(|mark| mark.height == height)
                })
                .copied()
                .collect();
            for voter in to_remove {
                self.log.append(&PollLogRecord::VoteRemoved { id, voter })?;
                if let Some(poll) = self.poll_mut(id) {
                    poll.remove_vote(&voter);
                }
                self.vote_marks.remove(&(id, voter));
            }

            let Some(poll) = self.find_poll(id) else {
                continue;
            };
            if poll.votes_in_favor.is_empty() {
                if poll.start_height != height {
                    return Err(VotingError::InvariantViolation(format!(
                        "poll {id} lost all votes at height {height} but started at {}",
                        poll.start_height
                    )));
                }
                self.log.append(&PollLogRecord::Deleted { id })?;
                deleted.push(id);
                tracing::info!(poll = id, height, "poll deleted by reorg");
            }
        }
        self.polls.retain(|poll| !deleted.contains(&poll.id));

        Ok(events)
    }

    /// Undo one poll's side effect, restoring the exact prior state.
    ///
    /// Whether the original execution changed anything — and at which
    /// position a reinstated entry belongs — is rederived by replaying the
    /// execution history up to this poll, so reversal is correct even across
    /// restarts.
    fn revert_side_effect(
        &self,
        poll_id: u64,
        federation: &mut FederationManager,
        whitelist: &mut WhitelistRepository,
    ) -> Result<Vec<RosterEvent>, VotingError> {
        let poll = self
            .find_poll(poll_id)
            .ok_or_else(|| VotingError::InvariantViolation("reverting unknown poll".into()))?;
        let data = poll.data.clone();
        let target = decode_target(&data).ok_or_else(|| {
            VotingError::InvariantViolation("reverted poll carries an invalid target".into())
        })?;

        let mut events = Vec::new();
        match (data.key, target) {
            (VoteKey::AddMember, VoteTarget::Member(member)) => {
                let before = self.roster_before_execution(poll_id);
                // A no-op add (member already present) reverts to a no-op.
                if !before.iter().any(|m| m.pubkey == member.pubkey) {
                    events.extend(federation.remove_member(&member)?);
                }
            }
            (VoteKey::KickMember, VoteTarget::Member(member)) => {
                let before = self.roster_before_execution(poll_id);
                if let Some(index) = before.iter().position(|m| m.pubkey == member.pubkey) {
                    events.extend(federation.insert_member_at(index, member)?);
                }
            }
            (VoteKey::WhitelistHash, VoteTarget::Hash(hash)) => {
                if !self.whitelist_before_execution(poll_id).contains(&hash) {
                    whitelist.remove(&hash)?;
                }
            }
            (VoteKey::RemoveHash, VoteTarget::Hash(hash)) => {
                let before = self.whitelist_before_execution(poll_id);
                if let Some(index) = before.iter().position(|h| *h == hash) {
                    whitelist.insert_at(index, hash)?;
                }
            }
            _ => {
                return Err(VotingError::InvariantViolation(
                    "vote key and payload disagree".into(),
                ))
            }
        }
        Ok(events)
    }
}
