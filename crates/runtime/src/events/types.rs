//! Event types for different topics.

use serde::{Deserialize, Serialize};

use game_core::{ActionType, ParameterSet, PlayerId, Tick};

use crate::dispatch::DispatchOutcome;

/// What happened to one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEvent {
    /// Issuing participant.
    pub player: PlayerId,
    /// Issuer-local id, for matching against the original submission.
    pub network_id: u32,
    pub action_type: ActionType,
    pub outcome: DispatchOutcome,
}

/// A tick finished applying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvent {
    pub tick: Tick,
    /// Number of actions applied or failed during the tick.
    pub actions: usize,
    pub checksum: [u8; 32],
}

/// Membership and synchronization changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    PeerConnected(PlayerId),
    PeerDisconnected(PlayerId),
    /// Local state no longer matches the host; commits are ignored until a
    /// snapshot arrives.
    Desynchronized { tick: Tick, reason: String },
    Resynchronized { tick: Tick },
}

/// JSON object of `params` in descriptor order, for log lines.
pub(crate) fn render_parameters(params: &ParameterSet) -> String {
    serde_json::to_string(params).unwrap_or_else(|_| params.to_string())
}
