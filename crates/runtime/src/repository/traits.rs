//! Repository contracts for the action log.

use super::{ActionLogEntry, Result};

/// Append side of an action log.
///
/// Implementations must preserve append order.
pub trait ActionLogWriter: Send {
    /// Appends an entry. Returns the byte offset (or index) it was written at.
    fn append(&mut self, entry: &ActionLogEntry) -> Result<u64>;

    /// Persists buffered entries.
    fn flush(&mut self) -> Result<()>;

    /// Log identifier (the file name for file-backed logs).
    fn session_id(&self) -> &str;
}

/// Read side of an action log.
pub trait ActionLogReader {
    /// Every entry in append order.
    fn read_all(&self) -> Result<Vec<ActionLogEntry>>;
}
