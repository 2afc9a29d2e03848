//! Dispatcher and replication queue.
//!
//! Every command passes the same gates: flag-derived admission, then the
//! action's own query. What happens next depends on the [`SessionRole`]:
//!
//! - `Local`: applied immediately.
//! - `Host`: sequenced at `tick + input_delay_ticks`, broadcast, and applied
//!   when [`Dispatcher::advance_tick`] releases it.
//! - `Client`: forwarded to the host; applied when the host's tick commit
//!   names it.
//!
//! Applying always re-queries against a working copy of the state and commits
//! only on an Ok result. The dispatcher performs no I/O: outgoing messages,
//! journal entries and events accumulate in outboxes the owning worker
//! drains.

mod admission;
mod error;
mod lifecycle;
mod outcome;
mod queue;

pub use admission::admit;
pub use error::DispatchError;
pub use lifecycle::{ActionPhase, Lifecycle};
pub use outcome::{DispatchOutcome, DropReason, QueueKey, RejectionStage};
pub use queue::{ActionQueue, QueuedAction};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

use game_core::{
    ActionError, ActionFlags, ActionResult, ActionType, CommandFlags, GameCommand, GameEnv,
    GameError, GameState, MapOracle, PlayerId, PlayerRegistry, Tick, TileInvalidator, codec,
};

use crate::events::{ActionEvent, Event, SessionEvent, TickEvent, render_parameters};
use crate::network::{NetMessage, Outgoing, PendingAction};
use crate::registry::{Roster, SessionRegistry};
use crate::repository::ActionLogEntry;

/// How this participant takes part in the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionRole {
    /// Single participant; no replication.
    #[default]
    Local,
    /// Session authority; sequences and commits every replicated action.
    Host,
    /// Follows the host's commits.
    Client,
}

impl SessionRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Host => "host",
            Self::Client => "client",
        }
    }

    pub const fn is_networked(self) -> bool {
        !matches!(self, Self::Local)
    }
}

/// Replication timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Ticks between sequencing an action and its target tick.
    pub input_delay_ticks: u64,
    /// Ticks after the target tick at which an action is released even if
    /// some peer has not acknowledged it.
    pub ack_deadline_ticks: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            input_delay_ticks: 1,
            ack_deadline_ticks: 4,
        }
    }
}

/// Collaborators actions run against.
#[derive(Clone)]
pub struct World {
    map: Arc<dyn MapOracle>,
    registry: Arc<SessionRegistry>,
    invalidator: Option<Arc<dyn TileInvalidator>>,
}

impl World {
    pub fn new(map: Arc<dyn MapOracle>, registry: Arc<SessionRegistry>) -> Self {
        Self {
            map,
            registry,
            invalidator: None,
        }
    }

    pub fn with_invalidator(mut self, invalidator: Arc<dyn TileInvalidator>) -> Self {
        self.invalidator = Some(invalidator);
        self
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn env(&self) -> GameEnv<'_> {
        let registry: &dyn PlayerRegistry = &*self.registry;
        GameEnv::new(Some(&*self.map), Some(registry), self.invalidator.as_deref())
    }
}

/// Actions applied during one tick and the resulting state checksum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub tick: Tick,
    pub applied: Vec<(QueueKey, DispatchOutcome)>,
    pub checksum: [u8; 32],
}

/// Point-in-time view of the dispatcher, for status queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionStatus {
    pub role: SessionRole,
    pub local_player: PlayerId,
    pub tick: Tick,
    pub synchronized: bool,
    pub pending: usize,
    pub peers: Vec<PlayerId>,
}

/// Single-writer owner of the simulation state of one participant.
pub struct Dispatcher {
    role: SessionRole,
    local_player: PlayerId,
    config: DispatchConfig,
    state: GameState,
    world: World,
    queue: ActionQueue,
    /// Host: connected clients.
    peers: BTreeSet<PlayerId>,
    next_seq: u64,
    next_network_id: u32,
    /// Client: requests sent to the host and not yet sequenced or rejected.
    in_flight: BTreeMap<u32, ActionType>,
    synchronized: bool,
    halted: bool,
    outbox: Vec<Outgoing>,
    journal: Vec<ActionLogEntry>,
    events: Vec<Event>,
}

impl Dispatcher {
    /// Creates a dispatcher over `state`.
    ///
    /// Clients start unsynchronized and ignore commits until the host's
    /// snapshot arrives.
    pub fn new(
        role: SessionRole,
        local_player: PlayerId,
        state: GameState,
        world: World,
        config: DispatchConfig,
    ) -> Self {
        Self {
            role,
            local_player,
            config,
            state,
            world,
            queue: ActionQueue::new(),
            peers: BTreeSet::new(),
            next_seq: 0,
            next_network_id: 0,
            in_flight: BTreeMap::new(),
            synchronized: role != SessionRole::Client,
            halted: false,
            outbox: Vec::new(),
            journal: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub fn local_player(&self) -> PlayerId {
        self.local_player
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn is_synchronized(&self) -> bool {
        self.synchronized
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            role: self.role,
            local_player: self.local_player,
            tick: self.state.tick,
            synchronized: self.synchronized,
            pending: self.queue.len(),
            peers: self.peers.iter().copied().collect(),
        }
    }

    pub fn take_outbox(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.outbox)
    }

    pub fn take_journal(&mut self) -> Vec<ActionLogEntry> {
        std::mem::take(&mut self.journal)
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Accepts a command issued by the local participant.
    ///
    /// The header's player and network id are assigned here.
    ///
    /// # Errors
    ///
    /// Only fatal conditions are errors; every rejection is an outcome.
    pub fn submit(&mut self, mut command: GameCommand) -> Result<DispatchOutcome, DispatchError> {
        if self.halted {
            return Err(DispatchError::Halted);
        }
        command.header.player = self.local_player;
        command.header.network_id = self.allocate_network_id();

        let mut lifecycle = Lifecycle::new();
        lifecycle.advance(ActionPhase::Validating)?;

        if let Err(result) = admit(
            &command,
            self.local_player,
            &self.state.session,
            self.role,
            &self.world.registry,
        ) {
            return self.reject_local(lifecycle, &command, RejectionStage::Admission, result);
        }

        let validation = match self.query(&command) {
            Ok(result) => result,
            Err(error) => return Err(self.halt(error)),
        };
        if !validation.is_ok() {
            return self.reject_local(lifecycle, &command, RejectionStage::Query, validation);
        }

        if command.header.flags.contains(CommandFlags::GHOST) {
            let outcome = DispatchOutcome::Previewed(validation);
            self.emit_action(&command, outcome.clone());
            return Ok(outcome);
        }

        if self.role == SessionRole::Local || command.flags().contains(ActionFlags::CLIENT_ONLY) {
            lifecycle.advance(ActionPhase::Queued)?;
            let key = QueueKey::new(self.state.tick, self.allocate_seq());
            let frame = codec::encode(&command);
            return self.apply(key, &command, &frame, lifecycle);
        }

        match self.role {
            SessionRole::Host => {
                let key = self.enqueue(command, lifecycle)?;
                Ok(DispatchOutcome::Queued { key })
            }
            _ => {
                lifecycle.advance(ActionPhase::Queued)?;
                let network_id = command.header.network_id;
                self.in_flight.insert(network_id, command.action_type());
                self.outbox.push(Outgoing {
                    to: PlayerId::HOST,
                    message: NetMessage::ActionRequest {
                        frame: codec::encode(&command),
                    },
                });
                debug!(
                    target: "runtime::dispatch",
                    action = command.action_type().as_str(),
                    network_id,
                    "Forwarded action to host"
                );
                Ok(DispatchOutcome::Forwarded { network_id })
            }
        }
    }

    /// Applies every due action, advances the clock and publishes the commit.
    ///
    /// # Errors
    ///
    /// Clients cannot advance on their own; they follow the host's commits.
    pub fn advance_tick(&mut self) -> Result<TickReport, DispatchError> {
        if self.halted {
            return Err(DispatchError::Halted);
        }
        let tick = self.state.tick;

        match self.role {
            SessionRole::Client => Err(DispatchError::NotPermitted {
                role: self.role,
                operation: "advance_tick",
            }),
            SessionRole::Local => {
                self.state.tick = tick.next();
                Ok(self.finish_tick(tick, Vec::new()))
            }
            SessionRole::Host => {
                let released =
                    self.queue
                        .release(tick, &self.peers, self.config.ack_deadline_ticks);
                let keys: Vec<QueueKey> = released.iter().map(|(key, _)| *key).collect();

                let mut applied = Vec::with_capacity(released.len());
                for (key, entry) in released {
                    let outcome = self.apply(key, &entry.command, &entry.frame, entry.lifecycle)?;
                    applied.push((key, outcome));
                }
                self.state.tick = tick.next();

                let report = self.finish_tick(tick, applied);
                self.broadcast(
                    NetMessage::TickCommit {
                        tick,
                        keys,
                        checksum: report.checksum,
                    },
                    None,
                );
                Ok(report)
            }
        }
    }

    /// Host: admits `peer`, sends it a snapshot and tells everyone else.
    ///
    /// Connecting a peer that is already connected only re-sends the
    /// snapshot; its group membership is left as it is.
    pub fn connect_peer(&mut self, peer: PlayerId) -> Result<(), DispatchError> {
        if self.role != SessionRole::Host {
            return Err(DispatchError::NotPermitted {
                role: self.role,
                operation: "connect_peer",
            });
        }
        if peer.is_host() || peer.is_none() {
            return Err(DispatchError::Protocol {
                peer,
                detail: "reserved player id".to_string(),
            });
        }

        if !self.peers.insert(peer) {
            debug!(target: "runtime::network", player = %peer, "Peer already connected, resending snapshot");
            self.send_snapshot(peer);
            return Ok(());
        }

        self.world.registry.add_player(peer, None);
        self.send_snapshot(peer);
        let roster = self.world.registry.snapshot();
        self.broadcast(NetMessage::RosterUpdate { roster }, Some(peer));

        debug!(target: "runtime::network", player = %peer, tick = %self.state.tick, "Peer connected");
        self.events
            .push(Event::Session(SessionEvent::PeerConnected(peer)));
        Ok(())
    }

    /// Handles loss of `peer`.
    ///
    /// On the host, actions the peer already had sequenced stay queued; its
    /// requests that arrive later are dropped. On a client, losing the host
    /// drops every request still in flight.
    pub fn disconnect_peer(&mut self, peer: PlayerId) -> Result<(), DispatchError> {
        match self.role {
            SessionRole::Local => {
                return Err(DispatchError::NotPermitted {
                    role: self.role,
                    operation: "disconnect_peer",
                });
            }
            SessionRole::Host => {
                if !self.peers.remove(&peer) {
                    return Ok(());
                }
                self.world.registry.remove_player(peer);
                let roster = self.world.registry.snapshot();
                self.broadcast(NetMessage::RosterUpdate { roster }, None);
            }
            SessionRole::Client => {
                if !peer.is_host() {
                    return Ok(());
                }
                for (network_id, action_type) in std::mem::take(&mut self.in_flight) {
                    self.events.push(Event::Action(ActionEvent {
                        player: self.local_player,
                        network_id,
                        action_type,
                        outcome: DispatchOutcome::Dropped {
                            reason: DropReason::HostDisconnected,
                        },
                    }));
                }
                self.synchronized = false;
            }
        }

        debug!(target: "runtime::network", player = %peer, "Peer disconnected");
        self.events
            .push(Event::Session(SessionEvent::PeerDisconnected(peer)));
        Ok(())
    }

    /// Decodes and handles bytes received from `from`.
    ///
    /// # Errors
    ///
    /// Undecodable input yields an error naming the offending peer, which the
    /// caller must disconnect.
    pub fn receive(&mut self, from: PlayerId, bytes: &[u8]) -> Result<(), DispatchError> {
        let message = NetMessage::decode(bytes).map_err(|error| DispatchError::MalformedMessage {
            peer: from,
            detail: error.to_string(),
        })?;
        self.handle_message(from, message)
    }

    pub fn handle_message(
        &mut self,
        from: PlayerId,
        message: NetMessage,
    ) -> Result<(), DispatchError> {
        if self.halted {
            return Err(DispatchError::Halted);
        }
        trace!(target: "runtime::network", player = %from, kind = message.kind(), "Message received");

        match (self.role, message) {
            (SessionRole::Local, _) => Err(DispatchError::NotPermitted {
                role: self.role,
                operation: "receive",
            }),
            (SessionRole::Host, NetMessage::ActionRequest { frame }) => {
                self.handle_request(from, &frame)
            }
            (SessionRole::Host, NetMessage::Ack { key }) => {
                if self.peers.contains(&from) && !self.queue.ack(&key, from) {
                    trace!(target: "runtime::network", player = %from, tick = %key.tick, seq = key.seq, "Ack for released action");
                }
                Ok(())
            }
            (SessionRole::Host, NetMessage::ResyncRequest { tick }) => {
                if self.peers.contains(&from) {
                    debug!(target: "runtime::network", player = %from, tick = %tick, "Peer requested resync");
                    self.send_snapshot(from);
                } else {
                    debug!(target: "runtime::network", player = %from, "Resync request from disconnected peer");
                }
                Ok(())
            }
            (SessionRole::Client, message) if from.is_host() => self.handle_host_message(message),
            (_, message) => Err(DispatchError::Protocol {
                peer: from,
                detail: format!("unexpected {} message", message.kind()),
            }),
        }
    }

    fn handle_host_message(&mut self, message: NetMessage) -> Result<(), DispatchError> {
        match message {
            NetMessage::ActionBroadcast { key, frame } => {
                self.accept_broadcast(key, frame)?;
                Ok(())
            }
            NetMessage::ActionRejected {
                network_id,
                stage,
                result,
            } => {
                // Requests dropped on a previous host loss are no longer tracked.
                let Some(action_type) = self.in_flight.remove(&network_id) else {
                    debug!(target: "runtime::dispatch", network_id, "Rejection for untracked request");
                    return Ok(());
                };
                debug!(
                    target: "runtime::dispatch",
                    action = action_type.as_str(),
                    network_id,
                    stage = stage.as_str(),
                    status = %result.status(),
                    "Host rejected action"
                );
                self.events.push(Event::Action(ActionEvent {
                    player: self.local_player,
                    network_id,
                    action_type,
                    outcome: DispatchOutcome::Rejected { stage, result },
                }));
                Ok(())
            }
            NetMessage::TickCommit {
                tick,
                keys,
                checksum,
            } => self.apply_commit(tick, &keys, checksum),
            NetMessage::StateSnapshot {
                state,
                roster,
                pending,
            } => self.restore(state, roster, pending),
            NetMessage::RosterUpdate { roster } => {
                self.world.registry.restore(roster);
                Ok(())
            }
            message => Err(DispatchError::Protocol {
                peer: PlayerId::HOST,
                detail: format!("unexpected {} message", message.kind()),
            }),
        }
    }

    fn handle_request(&mut self, from: PlayerId, frame: &[u8]) -> Result<(), DispatchError> {
        let mut command =
            codec::decode(frame).map_err(|source| DispatchError::Decode { peer: from, source })?;
        command.header.player = from;
        command
            .header
            .flags
            .remove(CommandFlags::GHOST | CommandFlags::REPLAY);

        let mut lifecycle = Lifecycle::new();
        if !self.peers.contains(&from) {
            lifecycle.advance(ActionPhase::Dropped)?;
            debug!(
                target: "runtime::dispatch",
                action = command.action_type().as_str(),
                player = %from,
                "Dropped request from disconnected peer"
            );
            self.emit_action(
                &command,
                DispatchOutcome::Dropped {
                    reason: DropReason::OriginDisconnected,
                },
            );
            return Ok(());
        }
        lifecycle.advance(ActionPhase::Validating)?;

        if let Err(result) = admit(
            &command,
            from,
            &self.state.session,
            self.role,
            &self.world.registry,
        ) {
            return self.reject_remote(lifecycle, &command, RejectionStage::Admission, result);
        }

        let validation = match self.query(&command) {
            Ok(result) => result,
            Err(error) => return Err(self.halt(error)),
        };
        if !validation.is_ok() {
            return self.reject_remote(lifecycle, &command, RejectionStage::Query, validation);
        }

        self.enqueue(command, lifecycle)?;
        Ok(())
    }

    /// Queues and acks a broadcast. A desynchronized client neither queues
    /// nor acks; the snapshot it asked for carries everything still pending.
    fn accept_broadcast(&mut self, key: QueueKey, frame: Vec<u8>) -> Result<(), DispatchError> {
        if !self.synchronized {
            trace!(target: "runtime::dispatch", tick = %key.tick, seq = key.seq, "Ignoring broadcast while desynchronized");
            return Ok(());
        }
        self.queue_broadcast(key, frame)
    }

    fn queue_broadcast(&mut self, key: QueueKey, frame: Vec<u8>) -> Result<(), DispatchError> {
        let command = codec::decode(&frame).map_err(|source| DispatchError::Decode {
            peer: PlayerId::HOST,
            source,
        })?;
        if command.header.player == self.local_player {
            self.in_flight.remove(&command.header.network_id);
            self.emit_action(&command, DispatchOutcome::Queued { key });
        }
        self.queue
            .insert(key, QueuedAction::new(command, frame, Lifecycle::replicated()));
        self.outbox.push(Outgoing {
            to: PlayerId::HOST,
            message: NetMessage::Ack { key },
        });
        Ok(())
    }

    fn apply_commit(
        &mut self,
        tick: Tick,
        keys: &[QueueKey],
        checksum: [u8; 32],
    ) -> Result<(), DispatchError> {
        if !self.synchronized {
            trace!(target: "runtime::dispatch", tick = %tick, "Ignoring commit while desynchronized");
            return Ok(());
        }
        if tick != self.state.tick {
            let reason = format!("commit for tick {tick} while at tick {}", self.state.tick);
            self.desync(reason);
            return Ok(());
        }

        let mut applied = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(entry) = self.queue.remove(key) else {
                let reason = format!("committed action {}/{} was never received", key.tick, key.seq);
                self.desync(reason);
                return Ok(());
            };
            let outcome = self.apply(*key, &entry.command, &entry.frame, entry.lifecycle)?;
            applied.push((*key, outcome));
        }
        self.state.tick = tick.next();

        let report = self.finish_tick(tick, applied);
        if report.checksum != checksum {
            let reason = format!(
                "checksum mismatch at tick {tick}: local {} host {}",
                hex::encode(report.checksum),
                hex::encode(checksum)
            );
            self.desync(reason);
        }
        Ok(())
    }

    fn restore(
        &mut self,
        state: GameState,
        roster: Roster,
        pending: Vec<PendingAction>,
    ) -> Result<(), DispatchError> {
        self.state = state;
        self.world.registry.restore(roster);
        self.queue.clear();
        for PendingAction { key, frame } in pending {
            self.queue_broadcast(key, frame)?;
        }
        self.synchronized = true;

        debug!(target: "runtime::network", tick = %self.state.tick, pending = self.queue.len(), "Applied state snapshot");
        self.events.push(Event::Session(SessionEvent::Resynchronized {
            tick: self.state.tick,
        }));
        Ok(())
    }

    fn enqueue(
        &mut self,
        command: GameCommand,
        mut lifecycle: Lifecycle,
    ) -> Result<QueueKey, DispatchError> {
        lifecycle.advance(ActionPhase::Queued)?;
        let key = QueueKey::new(
            self.state.tick + self.config.input_delay_ticks,
            self.allocate_seq(),
        );
        let frame = codec::encode(&command);
        self.broadcast(
            NetMessage::ActionBroadcast {
                key,
                frame: frame.clone(),
            },
            None,
        );

        debug!(
            target: "runtime::dispatch",
            action = command.action_type().as_str(),
            player = %command.header.player,
            tick = %key.tick,
            seq = key.seq,
            "Queued action"
        );
        self.emit_action(&command, DispatchOutcome::Queued { key });
        self.queue
            .insert(key, QueuedAction::new(command, frame, lifecycle));
        Ok(key)
    }

    /// Re-queries and executes `command` on a working copy, committing only
    /// on an Ok result.
    fn apply(
        &mut self,
        key: QueueKey,
        command: &GameCommand,
        frame: &[u8],
        mut lifecycle: Lifecycle,
    ) -> Result<DispatchOutcome, DispatchError> {
        lifecycle.advance(ActionPhase::Applying)?;

        let mut working = self.state.clone();
        let executed = {
            let env = self.world.env();
            command.execute(&mut working, &env)
        };
        let result = match executed {
            Ok(result) => result,
            Err(error) => return Err(self.halt(error)),
        };

        let outcome = if result.is_ok() {
            lifecycle.advance(ActionPhase::Applied)?;
            self.state = working;
            DispatchOutcome::Applied(result)
        } else {
            lifecycle.advance(ActionPhase::Failed)?;
            warn!(
                target: "runtime::dispatch",
                action = command.action_type().as_str(),
                player = %command.header.player,
                tick = %key.tick,
                seq = key.seq,
                status = %result.status(),
                "Action failed on execute"
            );
            DispatchOutcome::Failed(result)
        };

        let flags = command.flags();
        if !flags.intersects(ActionFlags::IGNORE_FOR_REPLAYS | ActionFlags::CLIENT_ONLY) {
            self.journal
                .push(ActionLogEntry::new(key.tick, key.seq, frame.to_vec()));
        }
        self.emit_action(command, outcome.clone());
        Ok(outcome)
    }

    fn query(&self, command: &GameCommand) -> Result<ActionResult, ActionError> {
        let env = self.world.env();
        command.query(&self.state, &env)
    }

    fn reject_local(
        &mut self,
        mut lifecycle: Lifecycle,
        command: &GameCommand,
        stage: RejectionStage,
        result: ActionResult,
    ) -> Result<DispatchOutcome, DispatchError> {
        lifecycle.advance(ActionPhase::Rejected)?;
        self.log_rejection(command, stage, &result);
        let outcome = DispatchOutcome::Rejected { stage, result };
        self.emit_action(command, outcome.clone());
        Ok(outcome)
    }

    fn reject_remote(
        &mut self,
        mut lifecycle: Lifecycle,
        command: &GameCommand,
        stage: RejectionStage,
        result: ActionResult,
    ) -> Result<(), DispatchError> {
        lifecycle.advance(ActionPhase::Rejected)?;
        self.log_rejection(command, stage, &result);
        self.outbox.push(Outgoing {
            to: command.header.player,
            message: NetMessage::ActionRejected {
                network_id: command.header.network_id,
                stage,
                result: result.clone(),
            },
        });
        self.emit_action(command, DispatchOutcome::Rejected { stage, result });
        Ok(())
    }

    fn log_rejection(&self, command: &GameCommand, stage: RejectionStage, result: &ActionResult) {
        debug!(
            target: "runtime::dispatch",
            action = command.action_type().as_str(),
            player = %command.header.player,
            stage = stage.as_str(),
            status = %result.status(),
            params = %render_parameters(&command.parameters()),
            "Action rejected"
        );
    }

    fn finish_tick(&mut self, tick: Tick, applied: Vec<(QueueKey, DispatchOutcome)>) -> TickReport {
        let checksum = self.state.checksum();
        self.events.push(Event::Tick(TickEvent {
            tick,
            actions: applied.len(),
            checksum,
        }));
        TickReport {
            tick,
            applied,
            checksum,
        }
    }

    fn send_snapshot(&mut self, peer: PlayerId) {
        let pending = self
            .queue
            .iter()
            .map(|(key, entry)| PendingAction {
                key: *key,
                frame: entry.frame.clone(),
            })
            .collect();
        self.outbox.push(Outgoing {
            to: peer,
            message: NetMessage::StateSnapshot {
                state: self.state.clone(),
                roster: self.world.registry.snapshot(),
                pending,
            },
        });
    }

    /// Client: stops following commits, drops the now meaningless queue and
    /// asks the host for a snapshot.
    fn desync(&mut self, reason: String) {
        self.synchronized = false;
        self.queue.clear();
        self.outbox.push(Outgoing {
            to: PlayerId::HOST,
            message: NetMessage::ResyncRequest {
                tick: self.state.tick,
            },
        });
        error!(target: "runtime::dispatch", tick = %self.state.tick, reason = %reason, "Session desynchronized");
        self.events.push(Event::Session(SessionEvent::Desynchronized {
            tick: self.state.tick,
            reason,
        }));
    }

    fn halt(&mut self, error: ActionError) -> DispatchError {
        self.halted = true;
        error!(
            target: "runtime::dispatch",
            code = error.error_code(),
            severity = error.severity().as_str(),
            error = %error,
            "Action error, halting session"
        );
        DispatchError::Action(error)
    }

    fn broadcast(&mut self, message: NetMessage, except: Option<PlayerId>) {
        for &peer in &self.peers {
            if Some(peer) == except {
                continue;
            }
            self.outbox.push(Outgoing {
                to: peer,
                message: message.clone(),
            });
        }
    }

    fn emit_action(&mut self, command: &GameCommand, outcome: DispatchOutcome) {
        self.events.push(Event::Action(ActionEvent {
            player: command.header.player,
            network_id: command.header.network_id,
            action_type: command.action_type(),
            outcome,
        }));
    }

    fn allocate_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn allocate_network_id(&mut self) -> u32 {
        let id = self.next_network_id;
        self.next_network_id = self.next_network_id.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests;
