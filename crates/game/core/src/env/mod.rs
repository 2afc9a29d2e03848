//! Traits describing the world and session collaborators actions consume.
//!
//! Oracles expose the tile map, the player/group registry, and the redraw
//! hook. The [`Env`] aggregate bundles them so actions can reach everything
//! they need without hard coupling to concrete implementations.
mod error;
mod map;
mod players;
mod render;

pub use error::OracleError;
pub use map::{MapOracle, Ownership, TileMap};
pub use players::PlayerRegistry;
pub use render::{RecordingInvalidator, TileInvalidator};

use crate::state::CoordsXY;

/// Aggregates the collaborators required by action queries and executions.
pub struct Env<'a, M, P, R>
where
    M: MapOracle + ?Sized,
    P: PlayerRegistry + ?Sized,
    R: TileInvalidator + ?Sized,
{
    map: Option<&'a M>,
    players: Option<&'a P>,
    invalidator: Option<&'a R>,
}

pub type GameEnv<'a> =
    Env<'a, dyn MapOracle + 'a, dyn PlayerRegistry + 'a, dyn TileInvalidator + 'a>;

impl<M, P, R> Clone for Env<'_, M, P, R>
where
    M: MapOracle + ?Sized,
    P: PlayerRegistry + ?Sized,
    R: TileInvalidator + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, P, R> Copy for Env<'_, M, P, R>
where
    M: MapOracle + ?Sized,
    P: PlayerRegistry + ?Sized,
    R: TileInvalidator + ?Sized,
{
}

impl<'a, M, P, R> Env<'a, M, P, R>
where
    M: MapOracle + ?Sized,
    P: PlayerRegistry + ?Sized,
    R: TileInvalidator + ?Sized,
{
    pub fn new(map: Option<&'a M>, players: Option<&'a P>, invalidator: Option<&'a R>) -> Self {
        Self {
            map,
            players,
            invalidator,
        }
    }

    pub fn with_all(map: &'a M, players: &'a P, invalidator: &'a R) -> Self {
        Self::new(Some(map), Some(players), Some(invalidator))
    }

    pub fn empty() -> Self {
        Self::new(None, None, None)
    }

    /// Returns the MapOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::MapNotAvailable` if no map oracle was provided.
    pub fn map(&self) -> Result<&'a M, OracleError> {
        self.map.ok_or(OracleError::MapNotAvailable)
    }

    /// Returns the PlayerRegistry, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::PlayersNotAvailable` if no registry was provided.
    pub fn players(&self) -> Result<&'a P, OracleError> {
        self.players.ok_or(OracleError::PlayersNotAvailable)
    }

    /// Requests a redraw of the tile containing `coords`.
    ///
    /// Headless sessions run without an invalidator; the call is then a no-op.
    pub fn invalidate_tile(&self, coords: CoordsXY) {
        if let Some(invalidator) = self.invalidator {
            invalidator.invalidate_tile_full(coords);
        }
    }
}
