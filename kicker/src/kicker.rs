//! The idle-members control loop.

use std::collections::BTreeMap;

use crate::KickerError;
use rondo_federation::{slot_holder, FederationManager};
use rondo_store::LastActiveStore;
use rondo_types::{Block, Clock, FederationMember, PoaParams, PublicKey, Timestamp, VotingData};
use rondo_voting::{VotingError, VotingManager};

/// Watches per-member last-active times and schedules kick votes for members
/// silent beyond `max_idle_secs`.
///
/// All time comparisons use block header times, so every node draws the same
/// conclusions from the same chain. The wall clock is only consulted once, to
/// seed entries on first run.
pub struct IdleMembersKicker {
    params: PoaParams,
    last_active: BTreeMap<PublicKey, u64>,
    store: Box<dyn LastActiveStore>,
}

impl IdleMembersKicker {
    /// Load persisted last-active times, seeding missing entries for current
    /// members with the present wall-clock time. Seeding prevents a cold
    /// start from declaring the whole federation idle at once.
    pub fn load(
        params: PoaParams,
        clock: &dyn Clock,
        store: Box<dyn LastActiveStore>,
        federation: &FederationManager,
    ) -> Result<Self, KickerError> {
        let mut last_active = store.load()?.unwrap_or_default();
        let now = clock.now().as_secs();
        let mut seeded = 0usize;
        for member in federation.members() {
            last_active.entry(member.pubkey).or_insert_with(|| {
                seeded += 1;
                now
            });
        }
        if seeded > 0 {
            store.save(&last_active)?;
            tracing::info!(seeded, "seeded last-active times for federation members");
        }
        Ok(Self {
            params,
            last_active,
            store,
        })
    }

    /// Last-seen unix seconds per member pubkey.
    pub fn last_active(&self) -> &BTreeMap<PublicKey, u64> {
        &self.last_active
    }

    /// Handle a connected block: credit the producing slot holder, then
    /// queue kick votes for members idle beyond the threshold.
    ///
    /// Kicks are only scheduled when this node itself is a federation member,
    /// and never for multisig members. A member this node has already moved
    /// to kick — queued or voted in any live poll — is skipped.
    pub fn on_block_connected(
        &mut self,
        block: &Block,
        federation: &FederationManager,
        voting: &VotingManager,
    ) -> Result<(), KickerError> {
        let header_time = block.header.time;
        if let Some(producer) = slot_holder(
            federation.members(),
            header_time,
            self.params.slot_duration_secs,
        ) {
            self.last_active
                .insert(producer.pubkey, header_time.as_secs());
            self.store.save(&self.last_active)?;
        }

        if !federation.is_federation_member() {
            return Ok(());
        }
        let Some(own_key) = federation.current_key() else {
            return Ok(());
        };

        for member in federation.members() {
            if member.is_multisig {
                continue;
            }
            let idle_secs = self.idle_secs(member, header_time);
            if idle_secs <= self.params.max_idle_secs {
                continue;
            }
            let vote = VotingData::kick_member(member);
            if voting.has_voted_or_scheduled(&own_key, &vote) {
                continue;
            }
            match voting.schedule_vote(vote, federation) {
                Ok(()) => {
                    tracing::info!(
                        member = %member.pubkey,
                        idle_secs,
                        "scheduled kick vote for idle member"
                    );
                }
                // Lost a race with another scheduler; the vote is in.
                Err(VotingError::DuplicateVote) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn idle_secs(&self, member: &FederationMember, now: Timestamp) -> u64 {
        match self.last_active.get(&member.pubkey) {
            Some(last) => now.since(Timestamp::from_secs(*last)),
            // No entry means the member joined without a MemberAdded event
            // reaching us; treat as fresh rather than immediately idle.
            None => 0,
        }
    }

    /// A member joined: start their idle clock at the consensus tip's header
    /// time, unless an entry already exists.
    pub fn on_member_added(
        &mut self,
        member: &FederationMember,
        tip_time: Timestamp,
    ) -> Result<(), KickerError> {
        if self.last_active.contains_key(&member.pubkey) {
            return Ok(());
        }
        self.last_active.insert(member.pubkey, tip_time.as_secs());
        self.store.save(&self.last_active)?;
        Ok(())
    }

    /// A member left: forget their last-active entry.
    pub fn on_member_kicked(&mut self, member: &FederationMember) -> Result<(), KickerError> {
        if self.last_active.remove(&member.pubkey).is_some() {
            self.store.save(&self.last_active)?;
        }
        Ok(())
    }
}
