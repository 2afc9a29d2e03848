//! Worker tasks that back the runtime orchestration.
//!
//! The session worker owns the dispatcher and serializes every command,
//! inbound message and clock tick through one task.

mod session;

pub use session::{Command, SessionWorker};
