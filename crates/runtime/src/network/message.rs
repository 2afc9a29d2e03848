use serde::{Deserialize, Serialize};

use game_core::{ActionResult, GameState, PlayerId, Tick};

use crate::dispatch::{QueueKey, RejectionStage};
use crate::registry::Roster;

/// A sequenced action still waiting for its tick, as sent to joining peers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub key: QueueKey,
    pub frame: Vec<u8>,
}

/// Session replication protocol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetMessage {
    /// Client → host: please sequence this action.
    ActionRequest { frame: Vec<u8> },
    /// Host → clients: action sequenced at `key`.
    ActionBroadcast { key: QueueKey, frame: Vec<u8> },
    /// Client → host: broadcast received.
    Ack { key: QueueKey },
    /// Host → requesting client: the request was turned away.
    ActionRejected {
        network_id: u32,
        stage: RejectionStage,
        result: ActionResult,
    },
    /// Host → clients: apply exactly `keys` for `tick`, then compare.
    TickCommit {
        tick: Tick,
        keys: Vec<QueueKey>,
        checksum: [u8; 32],
    },
    /// Host → client: full resynchronization.
    StateSnapshot {
        state: GameState,
        roster: Roster,
        pending: Vec<PendingAction>,
    },
    /// Host → clients: player membership changed.
    RosterUpdate { roster: Roster },
    /// Client → host: local state diverged, send a fresh snapshot.
    ResyncRequest { tick: Tick },
}

impl NetMessage {
    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ActionRequest { .. } => "action_request",
            Self::ActionBroadcast { .. } => "action_broadcast",
            Self::Ack { .. } => "ack",
            Self::ActionRejected { .. } => "action_rejected",
            Self::TickCommit { .. } => "tick_commit",
            Self::StateSnapshot { .. } => "state_snapshot",
            Self::RosterUpdate { .. } => "roster_update",
            Self::ResyncRequest { .. } => "resync_request",
        }
    }
}

/// A message addressed to one participant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outgoing {
    pub to: PlayerId,
    pub message: NetMessage,
}
