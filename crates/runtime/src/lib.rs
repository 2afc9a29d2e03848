//! Session runtime for the deterministic game-action framework.
//!
//! This crate sequences and replicates `game-core` commands across the
//! participants of a session. Consumers embed [`Runtime`] to submit actions,
//! drive ticks, subscribe to events, and exchange replication messages with
//! peers through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`dispatch`] holds the sans-IO dispatcher, queue and admission gate
//! - [`network`] defines the replication protocol and transports
//! - [`registry`] is the player and permission-group store
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`repository`] and [`replay`] persist and rebuild sessions
//! - [`logging`] installs the tracing subscriber
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod dispatch;
pub mod events;
pub mod logging;
pub mod network;
pub mod registry;
pub mod replay;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use dispatch::{
    ActionPhase, DispatchConfig, DispatchError, DispatchOutcome, Dispatcher, DropReason,
    QueueKey, RejectionStage, SessionRole, SessionStatus, TickReport, World,
};
pub use events::{ActionEvent, Event, EventBus, SessionEvent, TickEvent, Topic};
pub use logging::{LogConfig, LoggingError, init_logging};
pub use network::{
    Inbound, LoopbackHub, LoopbackTransport, NetMessage, Transport, TransportError,
};
pub use registry::{PermissionGroup, Roster, SessionRegistry};
pub use replay::{ReplayError, replay, replay_log};
pub use repository::{
    ActionLogEntry, ActionLogReader, ActionLogWriter, FileActionLog, FileRepository,
    InMemoryActionLog, RepositoryError,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
