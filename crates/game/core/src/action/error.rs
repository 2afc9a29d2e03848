//! Fatal action errors.
//!
//! Ordinary rejections are [`ActionResult`](super::ActionResult)s. The variants
//! here mean the world or its collaborators are unusable, and the affected
//! session must stop applying actions.

use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    /// A collaborator the action depends on is missing.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// World storage violated an invariant the action relies on.
    #[error("world storage corrupted: {0}")]
    StorageCorrupted(String),
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            ActionError::Oracle(error) => error.error_code(),
            ActionError::StorageCorrupted(_) => "ACTION_STORAGE_CORRUPTED",
        }
    }
}
