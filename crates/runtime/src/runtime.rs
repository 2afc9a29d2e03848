//! High-level runtime orchestrator.
//!
//! The runtime owns the session worker, wires up command/event channels, and
//! exposes a builder-based API for embedding one participant of a session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use game_core::{GameState, MapOracle, PlayerId, TileInvalidator};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::dispatch::{DispatchConfig, Dispatcher, SessionRole, World};
use crate::events::EventBus;
use crate::network::{Inbound, Transport};
use crate::registry::SessionRegistry;
use crate::repository::{ActionLogWriter, FileActionLog};
use crate::workers::{Command, SessionWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub dispatch: DispatchConfig,
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
    /// Advance the clock automatically at this period (hosts and local
    /// sessions). Manual `advance_tick` calls only when `None`.
    pub tick_interval: Option<Duration>,
    /// Directory for the action log; no log when `None`.
    pub action_log_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            dispatch: DispatchConfig::default(),
            command_buffer_size: 32,
            event_buffer_size: 100,
            tick_interval: None,
            action_log_dir: None,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `GAME_INPUT_DELAY_TICKS` - Ticks between sequencing and application (default: 1)
    /// - `GAME_ACK_DEADLINE_TICKS` - Ticks to wait for peer acks (default: 4)
    /// - `GAME_COMMAND_BUFFER` - Worker command queue size (default: 32)
    /// - `GAME_EVENT_BUFFER` - Event bus capacity per topic (default: 100)
    /// - `GAME_TICK_INTERVAL_MS` - Automatic tick period, 0 disables (default: unset)
    /// - `GAME_ACTION_LOG_DIR` - Action log directory (default: unset)
    ///
    /// Values that fail to parse keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).map(|value| value.trim().to_string());
        let parse = |key: &str| read(key).and_then(|value| value.parse::<u64>().ok());

        let mut config = Self::default();
        if let Some(delay) = parse("GAME_INPUT_DELAY_TICKS") {
            config.dispatch.input_delay_ticks = delay;
        }
        if let Some(deadline) = parse("GAME_ACK_DEADLINE_TICKS") {
            config.dispatch.ack_deadline_ticks = deadline;
        }
        if let Some(capacity) = parse("GAME_COMMAND_BUFFER") {
            config.command_buffer_size = (capacity as usize).max(1);
        }
        if let Some(capacity) = parse("GAME_EVENT_BUFFER") {
            config.event_buffer_size = (capacity as usize).max(1);
        }
        if let Some(millis) = parse("GAME_TICK_INTERVAL_MS") {
            config.tick_interval = (millis > 0).then(|| Duration::from_millis(millis));
        }
        if let Some(dir) = read("GAME_ACTION_LOG_DIR").filter(|dir| !dir.is_empty()) {
            config.action_log_dir = Some(PathBuf::from(dir));
        }
        config
    }
}

/// One participant of a session.
///
/// Design: Runtime owns the worker; [`RuntimeHandle`] provides a cloneable
/// façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    registry: Arc<SessionRegistry>,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// The player/group store actions of this participant run against.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker exits once every clone of the handle is dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    role: SessionRole,
    local_player: Option<PlayerId>,
    state: Option<GameState>,
    map: Option<Arc<dyn MapOracle>>,
    registry: Option<Arc<SessionRegistry>>,
    invalidator: Option<Arc<dyn TileInvalidator>>,
    transport: Option<(Arc<dyn Transport>, mpsc::UnboundedReceiver<Inbound>)>,
    action_log: Option<Box<dyn ActionLogWriter>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            role: SessionRole::Local,
            local_player: None,
            state: None,
            map: None,
            registry: None,
            invalidator: None,
            transport: None,
            action_log: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn role(mut self, role: SessionRole) -> Self {
        self.role = role;
        self
    }

    /// Required for clients; hosts and local sessions default to
    /// [`PlayerId::HOST`].
    pub fn local_player(mut self, player: PlayerId) -> Self {
        self.local_player = Some(player);
        self
    }

    /// Provide initial game state. Clients replace it with the host's
    /// snapshot on join.
    pub fn initial_state(mut self, state: GameState) -> Self {
        self.state = Some(state);
        self
    }

    /// Set required map oracle
    pub fn map(mut self, map: Arc<dyn MapOracle>) -> Self {
        self.map = Some(map);
        self
    }

    /// Share a registry; a registry with the default groups is created
    /// otherwise.
    pub fn registry(mut self, registry: Arc<SessionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn invalidator(mut self, invalidator: Arc<dyn TileInvalidator>) -> Self {
        self.invalidator = Some(invalidator);
        self
    }

    /// Connect the session to its peers. Required for hosts and clients.
    pub fn transport(
        mut self,
        transport: Arc<dyn Transport>,
        inbound: mpsc::UnboundedReceiver<Inbound>,
    ) -> Self {
        self.transport = Some((transport, inbound));
        self
    }

    /// Use `log` instead of a file log in `config.action_log_dir`.
    pub fn action_log(mut self, log: impl ActionLogWriter + 'static) -> Self {
        self.action_log = Some(Box::new(log));
        self
    }

    /// Validates the configuration and spawns the session worker.
    pub async fn build(self) -> Result<Runtime> {
        let map = self.map.ok_or(RuntimeError::MissingMap)?;
        let role = self.role;
        let local_player = resolve_local_player(role, self.local_player)?;
        if role.is_networked() && self.transport.is_none() {
            return Err(RuntimeError::MissingTransport { role });
        }

        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(SessionRegistry::with_default_groups()));
        let mut world = World::new(map, Arc::clone(&registry));
        if let Some(invalidator) = self.invalidator {
            world = world.with_invalidator(invalidator);
        }

        let action_log = match (self.action_log, &self.config.action_log_dir) {
            (Some(log), _) => Some(log),
            (None, Some(dir)) => {
                let file_name = format!("actions-{}-{}.log", role.as_str(), local_player.0);
                let log = FileActionLog::open_or_create(dir, file_name)?;
                Some(Box::new(log) as Box<dyn ActionLogWriter>)
            }
            (None, None) => None,
        };

        let dispatcher = Dispatcher::new(
            role,
            local_player,
            self.state.unwrap_or_default(),
            world,
            self.config.dispatch,
        );

        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);

        let mut worker = SessionWorker::new(dispatcher, command_rx, event_bus.clone());
        if let Some((transport, inbound)) = self.transport {
            worker = worker.with_transport(transport, inbound);
        }
        if let Some(log) = action_log {
            worker = worker.with_action_log(log);
        }
        if let Some(period) = self.config.tick_interval {
            if role != SessionRole::Client {
                worker = worker.with_tick_interval(period);
            }
        }

        tracing::info!(
            target: "runtime::worker",
            role = role.as_str(),
            player = %local_player,
            "Runtime built"
        );
        let worker_handle = tokio::spawn(worker.run());

        Ok(Runtime {
            handle: RuntimeHandle::new(command_tx, event_bus),
            registry,
            worker_handle,
        })
    }
}

fn resolve_local_player(role: SessionRole, player: Option<PlayerId>) -> Result<PlayerId> {
    match (role, player) {
        (SessionRole::Client, None) => Err(RuntimeError::InvalidLocalPlayer {
            role,
            player: PlayerId::NONE,
        }),
        (SessionRole::Client, Some(player)) if player.is_host() || player.is_none() => {
            Err(RuntimeError::InvalidLocalPlayer { role, player })
        }
        (SessionRole::Host, Some(player)) if !player.is_host() => {
            Err(RuntimeError::InvalidLocalPlayer { role, player })
        }
        (_, Some(player)) => Ok(player),
        (_, None) => Ok(PlayerId::HOST),
    }
}
