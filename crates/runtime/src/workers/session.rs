//! Session worker that owns the [`Dispatcher`] of one participant.
//!
//! Receives commands from [`RuntimeHandle`], bytes from the transport and
//! optional clock ticks, all on one task, so the dispatcher never needs a
//! lock. After every step it drains the dispatcher's outboxes: messages go to
//! the transport, journal entries to the action log, events to the bus.
//!
//! [`RuntimeHandle`]: crate::RuntimeHandle

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, trace, warn};

use game_core::{GameCommand, GameState, PlayerId};

use crate::api::{Result, RuntimeError};
use crate::dispatch::{DispatchError, DispatchOutcome, Dispatcher, SessionRole, SessionStatus, TickReport};
use crate::events::EventBus;
use crate::network::{Inbound, Outgoing, Transport};
use crate::repository::ActionLogWriter;

/// Commands that can be sent to the session worker
pub enum Command {
    Submit {
        command: GameCommand,
        reply: oneshot::Sender<Result<DispatchOutcome>>,
    },
    AdvanceTick {
        reply: oneshot::Sender<Result<TickReport>>,
    },
    ConnectPeer {
        peer: PlayerId,
        reply: oneshot::Sender<Result<()>>,
    },
    DisconnectPeer {
        peer: PlayerId,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Bytes from a peer handed in through the handle instead of the inbox.
    Deliver {
        inbound: Inbound,
        reply: oneshot::Sender<Result<()>>,
    },
    QueryState {
        reply: oneshot::Sender<GameState>,
    },
    QueryStatus {
        reply: oneshot::Sender<SessionStatus>,
    },
}

/// Background task that drives one participant's session.
pub struct SessionWorker {
    dispatcher: Dispatcher,
    command_rx: mpsc::Receiver<Command>,
    inbound_rx: Option<mpsc::UnboundedReceiver<Inbound>>,
    transport: Option<Arc<dyn Transport>>,
    event_bus: EventBus,
    action_log: Option<Box<dyn ActionLogWriter>>,
    tick_interval: Option<Duration>,
}

impl SessionWorker {
    pub fn new(
        dispatcher: Dispatcher,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            dispatcher,
            command_rx,
            inbound_rx: None,
            transport: None,
            event_bus,
            action_log: None,
            tick_interval: None,
        }
    }

    pub fn with_transport(
        mut self,
        transport: Arc<dyn Transport>,
        inbound_rx: mpsc::UnboundedReceiver<Inbound>,
    ) -> Self {
        self.transport = Some(transport);
        self.inbound_rx = Some(inbound_rx);
        self
    }

    pub fn with_action_log(mut self, log: Box<dyn ActionLogWriter>) -> Self {
        self.action_log = Some(log);
        self
    }

    /// Advance the clock automatically every `period`.
    pub fn with_tick_interval(mut self, period: Duration) -> Self {
        self.tick_interval = Some(period);
        self
    }

    /// Main worker loop. Returns once every handle is dropped.
    pub async fn run(mut self) {
        let mut ticker = self.tick_interval.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        debug!(
            target: "runtime::worker",
            role = self.dispatcher.role().as_str(),
            player = %self.dispatcher.local_player(),
            "Session worker started"
        );

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                inbound = next_inbound(&mut self.inbound_rx) => match inbound {
                    Some(inbound) => {
                        // Errors are logged and acted on inside.
                        let _ = self.handle_inbound(inbound);
                    }
                    None => {
                        debug!(target: "runtime::worker", "Transport inbox closed");
                        self.inbound_rx = None;
                    }
                },
                _ = next_tick(&mut ticker) => self.handle_clock_tick(),
            }
        }

        if let Some(log) = &mut self.action_log {
            if let Err(error) = log.flush() {
                error!(target: "runtime::repository", log = log.session_id(), error = %error, "Failed to flush action log");
            }
        }
        debug!(target: "runtime::worker", "Session worker stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Submit { command, reply } => {
                let result = self.dispatcher.submit(command).map_err(RuntimeError::from);
                self.flush();
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "Submit reply channel closed (caller dropped)");
                }
            }
            Command::AdvanceTick { reply } => {
                let result = self.dispatcher.advance_tick().map_err(RuntimeError::from);
                self.flush();
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "AdvanceTick reply channel closed (caller dropped)");
                }
            }
            Command::ConnectPeer { peer, reply } => {
                let result = self.dispatcher.connect_peer(peer).map_err(RuntimeError::from);
                self.flush();
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "ConnectPeer reply channel closed (caller dropped)");
                }
            }
            Command::DisconnectPeer { peer, reply } => {
                let result = self
                    .dispatcher
                    .disconnect_peer(peer)
                    .map_err(RuntimeError::from);
                self.flush();
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "DisconnectPeer reply channel closed (caller dropped)");
                }
            }
            Command::Deliver { inbound, reply } => {
                let result = self.handle_inbound(inbound).map_err(RuntimeError::from);
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "Deliver reply channel closed (caller dropped)");
                }
            }
            Command::QueryState { reply } => {
                if reply.send(self.dispatcher.state().clone()).is_err() {
                    debug!(target: "runtime::worker", "QueryState reply channel closed (caller dropped)");
                }
            }
            Command::QueryStatus { reply } => {
                if reply.send(self.dispatcher.status()).is_err() {
                    debug!(target: "runtime::worker", "QueryStatus reply channel closed (caller dropped)");
                }
            }
        }
    }

    /// Feeds peer bytes to the dispatcher. A peer whose input cannot be
    /// processed is disconnected.
    fn handle_inbound(&mut self, inbound: Inbound) -> std::result::Result<(), DispatchError> {
        let result = self.dispatcher.receive(inbound.from, &inbound.bytes);

        if let Err(error) = &result {
            match error.offending_peer() {
                Some(peer) => {
                    error!(
                        target: "runtime::network",
                        player = %peer,
                        error = %error,
                        "Disconnecting peer after bad input"
                    );
                    if let Err(disconnect) = self.dispatcher.disconnect_peer(peer) {
                        warn!(target: "runtime::network", player = %peer, error = %disconnect, "Disconnect failed");
                    }
                }
                None => {
                    error!(target: "runtime::network", player = %inbound.from, error = %error, "Inbound message failed");
                }
            }
        }

        self.flush();
        result
    }

    fn handle_clock_tick(&mut self) {
        if self.dispatcher.role() == SessionRole::Client || self.dispatcher.is_halted() {
            return;
        }
        match self.dispatcher.advance_tick() {
            Ok(report) => trace!(
                target: "runtime::worker",
                tick = %report.tick,
                actions = report.applied.len(),
                "Tick committed"
            ),
            Err(error) => error!(target: "runtime::worker", error = %error, "Automatic tick failed"),
        }
        self.flush();
    }

    /// Drains the dispatcher's outboxes.
    fn flush(&mut self) {
        for Outgoing { to, message } in self.dispatcher.take_outbox() {
            let Some(transport) = &self.transport else {
                trace!(target: "runtime::network", player = %to, kind = message.kind(), "No transport, message discarded");
                continue;
            };
            let bytes = match message.encode() {
                Ok(bytes) => bytes,
                Err(error) => {
                    error!(target: "runtime::network", kind = message.kind(), error = %error, "Failed to encode message");
                    continue;
                }
            };
            if let Err(error) = transport.send(to, bytes) {
                warn!(target: "runtime::network", player = %to, kind = message.kind(), error = %error, "Send failed");
            }
        }

        let journal = self.dispatcher.take_journal();
        if let Some(log) = &mut self.action_log {
            if !journal.is_empty() {
                for entry in &journal {
                    if let Err(error) = log.append(entry) {
                        error!(
                            target: "runtime::repository",
                            tick = %entry.tick,
                            seq = entry.seq,
                            error = %error,
                            "Failed to append action log entry"
                        );
                    }
                }
                if let Err(error) = log.flush() {
                    error!(target: "runtime::repository", log = log.session_id(), error = %error, "Failed to flush action log");
                }
            }
        }

        for event in self.dispatcher.take_events() {
            self.event_bus.publish(event);
        }
    }
}

async fn next_inbound(rx: &mut Option<mpsc::UnboundedReceiver<Inbound>>) -> Option<Inbound> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
