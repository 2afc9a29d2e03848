//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! submitting actions, driving the clock or streaming events from specific
//! topics.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::{GameCommand, GameState, PlayerId};

use super::errors::{Result, RuntimeError};
use crate::dispatch::{DispatchOutcome, SessionStatus, TickReport};
use crate::events::{Event, EventBus, Topic};
use crate::network::Inbound;
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Submit a command issued by the local player.
    ///
    /// Rejections come back as [`DispatchOutcome::Rejected`]; `Err` means the
    /// session itself failed.
    pub async fn submit(&self, command: GameCommand) -> Result<DispatchOutcome> {
        self.request(|reply| Command::Submit { command, reply })
            .await?
    }

    /// Commit the current tick. Hosts and local sessions only.
    pub async fn advance_tick(&self) -> Result<TickReport> {
        self.request(|reply| Command::AdvanceTick { reply }).await?
    }

    /// Admit a newly connected peer (host only).
    pub async fn connect_peer(&self, peer: PlayerId) -> Result<()> {
        self.request(|reply| Command::ConnectPeer { peer, reply })
            .await?
    }

    /// Report that `peer` went away.
    pub async fn disconnect_peer(&self, peer: PlayerId) -> Result<()> {
        self.request(|reply| Command::DisconnectPeer { peer, reply })
            .await?
    }

    /// Hand bytes received from `from` to the session, bypassing the
    /// transport's inbox.
    pub async fn deliver(&self, from: PlayerId, bytes: Vec<u8>) -> Result<()> {
        let inbound = Inbound { from, bytes };
        self.request(|reply| Command::Deliver { inbound, reply })
            .await?
    }

    /// Query the current game state (read-only snapshot)
    pub async fn state(&self) -> Result<GameState> {
        self.request(|reply| Command::QueryState { reply }).await
    }

    pub async fn status(&self) -> Result<SessionStatus> {
        self.request(|reply| Command::QueryStatus { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Action` - Outcome of every command seen by this participant
    /// - `Topic::Tick` - Tick completion with the state checksum
    /// - `Topic::Session` - Peer membership and synchronization changes
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
