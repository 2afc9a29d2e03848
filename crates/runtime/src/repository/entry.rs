//! Action log entry type.

use serde::{Deserialize, Serialize};

use game_core::Tick;

/// One applied action, as stored in `actions.log`.
///
/// The frame is the command's wire encoding, so the log shares the codec's
/// versioning with the network protocol.
///
/// # Layout
///
/// Each entry is serialized using bincode and stored with a length prefix:
/// ```text
/// [u32 length][bincode serialized ActionLogEntry]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    /// Tick the action was applied in.
    pub tick: Tick,
    /// Host-assigned sequence number; orders actions within a tick.
    pub seq: u64,
    /// Encoded command.
    pub frame: Vec<u8>,
}

impl ActionLogEntry {
    pub fn new(tick: Tick, seq: u64, frame: Vec<u8>) -> Self {
        Self { tick, seq, frame }
    }
}
