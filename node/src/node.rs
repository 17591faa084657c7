//! The governance node: construction, event wiring, and read surface.

use std::sync::RwLock;

use rondo_federation::{FederationManager, RosterEvent};
use rondo_kicker::IdleMembersKicker;
use rondo_store::{LastActiveStore, MemberStore, PollLog, WhitelistStore};
use rondo_store_fs::open_stores;
use rondo_types::{Block, Clock, FederationMember, Hash256, Poll, SystemClock, VotingData};
use rondo_voting::{VotingManager, WhitelistRepository};

use crate::event_bus::{EventBus, NodeEvent};
use crate::{NodeConfig, NodeError};

/// The storage backends a node runs on. Production uses the file backend via
/// [`RondoNode::open`]; tests inject in-memory stores.
pub struct NodeStores {
    pub poll_log: Box<dyn PollLog>,
    pub members: Box<dyn MemberStore>,
    pub last_active: Box<dyn LastActiveStore>,
    pub whitelist: Box<dyn WhitelistStore>,
}

/// The single-writer governance state: every mutation happens on the
/// consensus thread that delivers block events, under one write lock.
pub(crate) struct GovernanceCore {
    pub(crate) federation: FederationManager,
    pub(crate) voting: VotingManager,
    pub(crate) whitelist: WhitelistRepository,
    pub(crate) kicker: IdleMembersKicker,
}

/// The Rondo governance node.
///
/// Consumes `BlockConnected` / `BlockDisconnected` notifications from the
/// consensus engine, drives the voting manager, federation manager and idle
/// kicker in topological order (the synchronous-delivery guarantee the event
/// bus would otherwise provide), and publishes the resulting events for
/// external observers.
pub struct RondoNode {
    core: RwLock<GovernanceCore>,
    bus: EventBus,
}

impl RondoNode {
    /// Open a node over the file-backed stores in `config.data_dir`.
    pub fn open(config: &NodeConfig) -> Result<Self, NodeError> {
        let (poll_log, members, last_active, whitelist) = open_stores(&config.data_dir)?;
        let stores = NodeStores {
            poll_log: Box::new(poll_log),
            members: Box::new(members),
            last_active: Box::new(last_active),
            whitelist: Box::new(whitelist),
        };
        Self::open_with(config, stores, &SystemClock)
    }

    /// Open a node over explicit stores and clock (tests use the nullables).
    pub fn open_with(
        config: &NodeConfig,
        stores: NodeStores,
        clock: &dyn Clock,
    ) -> Result<Self, NodeError> {
        let genesis = config.genesis_roster()?;
        let own_key = config.parsed_own_key()?;

        let federation = FederationManager::load(genesis.clone(), own_key, stores.members)?;
        let whitelist = WhitelistRepository::load(stores.whitelist)?;
        let voting = VotingManager::load(config.params, genesis, stores.poll_log)?;
        let kicker =
            IdleMembersKicker::load(config.params, clock, stores.last_active, &federation)?;

        tracing::info!(
            members = federation.member_count(),
            federation_member = federation.is_federation_member(),
            "governance node ready"
        );

        Ok(Self {
            core: RwLock::new(GovernanceCore {
                federation,
                voting,
                whitelist,
                kicker,
            }),
            bus: EventBus::new(),
        })
    }

    /// Register an observer for governance events. Wiring happens at startup,
    /// before block processing begins.
    pub fn subscribe_events(&mut self, listener: Box<dyn Fn(&NodeEvent) + Send + Sync>) {
        self.bus.subscribe(listener);
    }

    pub(crate) fn read_core(&self) -> std::sync::RwLockReadGuard<'_, GovernanceCore> {
        self.core.read().expect("governance core lock poisoned")
    }

    fn write_core(&self) -> std::sync::RwLockWriteGuard<'_, GovernanceCore> {
        self.core.write().expect("governance core lock poisoned")
    }

    /// Process a connected block through the whole governance core.
    ///
    /// Order matters: the voting manager first (it may mutate the roster via
    /// poll execution), then the kicker's member-event handlers (so a member
    /// kicked by this very block is no longer idle-tracked), then the
    /// kicker's own block handler. Events go out on the bus afterwards, while
    /// handlers have already observed the new roster.
    pub fn on_block_connected(&self, block: &Block, height: u64) -> Result<(), NodeError> {
        let events = {
            let mut guard = self.write_core();
            let core = &mut *guard;
            let events = core.voting.on_block_connected(
                block,
                height,
                &mut core.federation,
                &mut core.whitelist,
            )?;
            for event in &events {
                match event {
                    RosterEvent::MemberAdded(member) => {
                        core.kicker.on_member_added(member, block.header.time)?
                    }
                    RosterEvent::MemberKicked(member) => core.kicker.on_member_kicked(member)?,
                }
            }
            core.kicker
                .on_block_connected(block, &core.federation, &core.voting)?;
            events
        };

        for event in events {
            self.bus.emit(&roster_to_node_event(event));
        }
        self.bus.emit(&NodeEvent::BlockConnected {
            hash: block.hash,
            height,
        });
        Ok(())
    }

    /// Unwind a disconnected block. Delivered strictly before any replacement
    /// block at the same or a higher height is connected.
    pub fn on_block_disconnected(&self, block: &Block, height: u64) -> Result<(), NodeError> {
        let events = {
            let mut guard = self.write_core();
            let core = &mut *guard;
            let events = core.voting.on_block_disconnected(
                block,
                height,
                &mut core.federation,
                &mut core.whitelist,
            )?;
            for event in &events {
                match event {
                    RosterEvent::MemberAdded(member) => {
                        core.kicker.on_member_added(member, block.header.time)?
                    }
                    RosterEvent::MemberKicked(member) => core.kicker.on_member_kicked(member)?,
                }
            }
            events
        };

        for event in events {
            self.bus.emit(&roster_to_node_event(event));
        }
        self.bus.emit(&NodeEvent::BlockDisconnected {
            hash: block.hash,
            height,
        });
        Ok(())
    }

    // ── Read surface (consistent snapshots under the shared lock) ──────

    pub fn members(&self) -> Vec<FederationMember> {
        self.read_core().federation.members().to_vec()
    }

    /// The roster as it stood at `height`; used to validate historical block
    /// signers.
    pub fn members_at(&self, height: u64) -> Vec<FederationMember> {
        self.read_core().voting.members_at(height)
    }

    pub fn is_federation_member(&self) -> bool {
        self.read_core().federation.is_federation_member()
    }

    pub fn pending_polls(&self) -> Vec<Poll> {
        self.read_core().voting.pending_polls()
    }

    pub fn approved_polls(&self) -> Vec<Poll> {
        self.read_core().voting.approved_polls()
    }

    pub fn executed_polls(&self) -> Vec<Poll> {
        self.read_core().voting.executed_polls()
    }

    pub fn scheduled_votes(&self) -> Vec<VotingData> {
        self.read_core().voting.scheduled_votes()
    }

    /// Drain the scheduled-votes queue for the block producer; called once
    /// per block this node seals.
    pub fn take_scheduled_votes(&self) -> Vec<VotingData> {
        self.read_core().voting.take_scheduled_votes()
    }

    pub fn whitelisted_hashes(&self) -> Vec<Hash256> {
        self.read_core().whitelist.hashes().to_vec()
    }
}

fn roster_to_node_event(event: RosterEvent) -> NodeEvent {
    match event {
        RosterEvent::MemberAdded(member) => NodeEvent::MemberAdded { member },
        RosterEvent::MemberKicked(member) => NodeEvent::MemberKicked { member },
    }
}
