//! What the dispatcher reports back for a submitted command.

use serde::{Deserialize, Serialize};

use game_core::{ActionResult, Tick};

/// Position of a replicated action in the global application order.
///
/// Ordered by tick first, then by the host-assigned sequence number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueueKey {
    pub tick: Tick,
    pub seq: u64,
}

impl QueueKey {
    pub fn new(tick: Tick, seq: u64) -> Self {
        Self { tick, seq }
    }
}

/// Which gate turned a command away.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionStage {
    /// Flag, mode, authority or permission gate; `query` never ran.
    Admission,
    /// The action's own `query` returned a non-Ok result.
    Query,
}

impl RejectionStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admission => "admission",
            Self::Query => "query",
        }
    }
}

/// Why a command never reached `execute`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropReason {
    /// The issuing peer left before its request was sequenced.
    OriginDisconnected,
    /// The host went away while the request was in flight.
    HostDisconnected,
}

/// Result of handing a command to the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchOutcome {
    /// Executed and committed.
    Applied(ActionResult),
    /// Passed admission but failed when executed; state is unchanged.
    Failed(ActionResult),
    /// Sequenced for replicated application at `key.tick`.
    Queued { key: QueueKey },
    /// Sent to the host; the outcome arrives later as an event.
    Forwarded { network_id: u32 },
    /// Ghost command: validated only, never applied or replicated.
    Previewed(ActionResult),
    Rejected {
        stage: RejectionStage,
        result: ActionResult,
    },
    Dropped { reason: DropReason },
}

impl DispatchOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// The action result carried by this outcome, if any.
    pub fn result(&self) -> Option<&ActionResult> {
        match self {
            Self::Applied(result)
            | Self::Failed(result)
            | Self::Previewed(result)
            | Self::Rejected { result, .. } => Some(result),
            Self::Queued { .. } | Self::Forwarded { .. } | Self::Dropped { .. } => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Applied(_) => "applied",
            Self::Failed(_) => "failed",
            Self::Queued { .. } => "queued",
            Self::Forwarded { .. } => "forwarded",
            Self::Previewed(_) => "previewed",
            Self::Rejected { .. } => "rejected",
            Self::Dropped { .. } => "dropped",
        }
    }
}
