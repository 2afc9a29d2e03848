//! Oracle access errors.

use crate::error::{ErrorSeverity, GameError};

/// Errors that occur when accessing oracle collaborators.
///
/// A missing oracle means the session was wired incorrectly; actions cannot
/// produce a meaningful result without it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    /// MapOracle is not available in the environment.
    #[error("MapOracle not available")]
    MapNotAvailable,

    /// PlayerRegistry is not available in the environment.
    #[error("PlayerRegistry not available")]
    PlayersNotAvailable,
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            OracleError::MapNotAvailable => "ORACLE_MAP_NOT_AVAILABLE",
            OracleError::PlayersNotAvailable => "ORACLE_PLAYERS_NOT_AVAILABLE",
        }
    }
}
