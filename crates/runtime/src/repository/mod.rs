//! Repository layer for the action log.
//!
//! The log holds every replicated action a participant applied, in
//! application order, as the exact wire frame it was applied from. Replaying
//! it over the session's initial state reproduces the final state.

mod entry;
mod error;
mod log;
mod traits;

pub use entry::ActionLogEntry;
pub use error::{RepositoryError, Result};
pub use log::{FileActionLog, FileRepository, InMemoryActionLog};
pub use traits::{ActionLogReader, ActionLogWriter};
