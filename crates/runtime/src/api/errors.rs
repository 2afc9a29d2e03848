//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, dispatch, transport and the
//! action log so clients can bubble them up with consistent context.

use thiserror::Error;
use tokio::sync::oneshot;

use game_core::PlayerId;

use crate::dispatch::{DispatchError, SessionRole};
use crate::network::TransportError;
pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("runtime requires a map oracle to be configured before building")]
    MissingMap,

    #[error("a {} session requires a transport", role.as_str())]
    MissingTransport { role: SessionRole },

    #[error("{player} cannot be the local player of a {} session", role.as_str())]
    InvalidLocalPlayer { role: SessionRole, player: PlayerId },
}
