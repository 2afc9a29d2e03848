//! Authoritative simulation state.
//!
//! This module owns the mutable world/session data that actions touch. Runtime
//! layers clone or query this state but mutate it exclusively through an
//! action's `execute`.
mod common;
mod session;
mod spawns;

pub use common::{
    CoordsXY, CoordsXYZ, CoordsXYZD, DIRECTION_OFFSETS, GroupId, PlayerId, Tick, TileCoordsXYZ,
    direction_offset,
};
pub use session::{ScreenMode, SessionState};
pub use spawns::{PeepSpawn, PeepSpawns};

use sha2::{Digest, Sha256};

/// Canonical snapshot of the deterministic simulation state.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    /// Number of ticks fully applied so far.
    pub tick: Tick,
    pub session: SessionState,
    pub peep_spawns: PeepSpawns,
}

impl GameState {
    pub fn new(session: SessionState) -> Self {
        Self {
            tick: Tick::ZERO,
            session,
            peep_spawns: PeepSpawns::new(),
        }
    }

    /// SHA-256 over a canonical byte walk of the state.
    ///
    /// Participants compare this after every committed tick; any difference
    /// means the simulations diverged. The pause flag is session metadata and
    /// is not covered.
    pub fn checksum(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.tick.0.to_be_bytes());
        hasher.update([self.session.mode.as_byte(), u8::from(self.session.sandbox)]);
        hasher.update((self.peep_spawns.len() as u32).to_be_bytes());
        for spawn in self.peep_spawns.iter() {
            hasher.update(spawn.x.to_be_bytes());
            hasher.update(spawn.y.to_be_bytes());
            hasher.update(spawn.z.to_be_bytes());
            hasher.update([spawn.direction]);
        }
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_stable_for_equal_states() {
        let a = GameState::new(SessionState::new(ScreenMode::ScenarioEditor));
        let b = a.clone();
        assert_eq!(a.checksum(), b.checksum());
    }

    #[test]
    fn checksum_tracks_spawn_order() {
        let mut a = GameState::default();
        a.peep_spawns
            .push_evicting_oldest(CoordsXYZD::new(33, 48, 0, 0));
        a.peep_spawns
            .push_evicting_oldest(CoordsXYZD::new(97, 48, 0, 0));

        let mut b = GameState::default();
        b.peep_spawns
            .push_evicting_oldest(CoordsXYZD::new(97, 48, 0, 0));
        b.peep_spawns
            .push_evicting_oldest(CoordsXYZD::new(33, 48, 0, 0));

        assert_ne!(a.checksum(), b.checksum());
    }

    #[test]
    fn checksum_ignores_pause() {
        let running = GameState::default();
        let mut paused = running.clone();
        paused.session.paused = true;

        assert_eq!(running.checksum(), paused.checksum());
    }
}
