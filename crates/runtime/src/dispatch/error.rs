//! Dispatcher errors.
//!
//! Rejections are outcomes, not errors. These variants mean a peer sent
//! something unreadable, the caller used the dispatcher against its role, or
//! the world became unusable.

use thiserror::Error;

use game_core::{ActionError, CodecError, PlayerId};

use super::SessionRole;
use super::lifecycle::ActionPhase;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// A peer's action frame failed to decode. The peer must be disconnected.
    #[error("undecodable action frame from {peer}")]
    Decode {
        peer: PlayerId,
        #[source]
        source: CodecError,
    },

    /// A peer's message envelope failed to decode. The peer must be disconnected.
    #[error("malformed message from {peer}: {detail}")]
    MalformedMessage { peer: PlayerId, detail: String },

    /// A well-formed message that makes no sense in the current session.
    #[error("protocol violation by {peer}: {detail}")]
    Protocol { peer: PlayerId, detail: String },

    #[error("{operation} is not available to a {} session", role.as_str())]
    NotPermitted {
        role: SessionRole,
        operation: &'static str,
    },

    #[error("invalid lifecycle transition {} -> {}", from.as_str(), to.as_str())]
    InvalidTransition { from: ActionPhase, to: ActionPhase },

    /// A previous fatal error stopped this session from applying actions.
    #[error("session halted after a fatal error")]
    Halted,

    #[error(transparent)]
    Action(#[from] ActionError),
}

impl DispatchError {
    /// Peer whose input caused this error and that should be disconnected.
    pub fn offending_peer(&self) -> Option<PlayerId> {
        match self {
            Self::Decode { peer, .. }
            | Self::MalformedMessage { peer, .. }
            | Self::Protocol { peer, .. } => Some(*peer),
            _ => None,
        }
    }
}
