//! Deterministic reconstruction of a session from its action log.

use thiserror::Error;
use tracing::{debug, warn};

use game_core::{
    ActionError, CodecError, CommandFlags, GameEnv, GameState, Tick, codec,
};

use crate::repository::{ActionLogEntry, ActionLogReader, RepositoryError};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("log entry {tick}/{seq} does not decode")]
    Decode {
        tick: Tick,
        seq: u64,
        #[source]
        source: CodecError,
    },

    #[error("log entry {tick}/{seq} is not after {previous_tick}/{previous_seq}")]
    OutOfOrder {
        tick: Tick,
        seq: u64,
        previous_tick: Tick,
        previous_seq: u64,
    },

    #[error("log entry {tick} predates the initial state at tick {initial}")]
    BeforeInitialState { tick: Tick, initial: Tick },

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Replays `entries` over `initial` and returns the state at tick `until`.
///
/// Each entry is applied in the tick it was logged at, with the `REPLAY`
/// flag set, through the same re-query then execute path live sessions use.
/// Entries at or after `until` are not applied. Entries that failed live
/// fail again identically and leave the state untouched.
///
/// # Errors
///
/// Entries must be strictly increasing in (tick, seq) and not older than
/// the initial state.
pub fn replay(
    initial: GameState,
    entries: &[ActionLogEntry],
    env: &GameEnv<'_>,
    until: Tick,
) -> Result<GameState, ReplayError> {
    let mut state = initial;
    let mut previous: Option<(Tick, u64)> = None;
    let mut applied = 0usize;
    let mut failed = 0usize;

    for entry in entries {
        if let Some((previous_tick, previous_seq)) = previous {
            if (entry.tick, entry.seq) <= (previous_tick, previous_seq) {
                return Err(ReplayError::OutOfOrder {
                    tick: entry.tick,
                    seq: entry.seq,
                    previous_tick,
                    previous_seq,
                });
            }
        }
        previous = Some((entry.tick, entry.seq));

        if entry.tick >= until {
            break;
        }
        if entry.tick < state.tick {
            return Err(ReplayError::BeforeInitialState {
                tick: entry.tick,
                initial: state.tick,
            });
        }
        state.tick = entry.tick;

        let mut command = codec::decode(&entry.frame).map_err(|source| ReplayError::Decode {
            tick: entry.tick,
            seq: entry.seq,
            source,
        })?;
        command.header.flags.insert(CommandFlags::REPLAY);

        let mut working = state.clone();
        let result = command.execute(&mut working, env)?;
        if result.is_ok() {
            state = working;
            applied += 1;
        } else {
            warn!(
                target: "runtime::replay",
                action = command.action_type().as_str(),
                tick = %entry.tick,
                seq = entry.seq,
                status = %result.status(),
                "Replayed action failed"
            );
            failed += 1;
        }
    }

    if state.tick < until {
        state.tick = until;
    }
    debug!(target: "runtime::replay", until = %until, applied, failed, "Replay finished");
    Ok(state)
}

/// Reads every entry from `log` and replays it; see [`replay`].
pub fn replay_log(
    initial: GameState,
    log: &dyn ActionLogReader,
    env: &GameEnv<'_>,
    until: Tick,
) -> Result<GameState, ReplayError> {
    let entries = log.read_all()?;
    replay(initial, &entries, env, until)
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{
        CoordsXYZD, GameCommand, PlacePeepSpawnAction, ScreenMode, SessionState, TileCoordsXYZ,
        TileMap,
    };

    use crate::registry::SessionRegistry;

    fn editor_state() -> GameState {
        GameState::new(SessionState::new(ScreenMode::ScenarioEditor))
    }

    fn logged(tick: u64, seq: u64, x: i32) -> ActionLogEntry {
        let command =
            GameCommand::new(PlacePeepSpawnAction::new(CoordsXYZD::new(x, 32, 0, 1)));
        ActionLogEntry::new(Tick(tick), seq, codec::encode(&command))
    }

    fn with_env<R>(f: impl FnOnce(&GameEnv<'_>) -> R) -> R {
        let map = TileMap::new(64)
            .with_path(TileCoordsXYZ::new(1, 1, 0))
            .with_path(TileCoordsXYZ::new(2, 1, 0))
            .with_path(TileCoordsXYZ::new(3, 1, 0));
        let registry = SessionRegistry::with_default_groups();
        let env = GameEnv::new(
            Some(&map as &dyn game_core::MapOracle),
            Some(&registry as &dyn game_core::PlayerRegistry),
            None,
        );
        f(&env)
    }

    #[test]
    fn replay_applies_entries_in_their_ticks() {
        let entries = [logged(1, 0, 32), logged(1, 1, 64), logged(4, 2, 96)];

        let state = with_env(|env| replay(editor_state(), &entries, env, Tick(6))).unwrap();

        assert_eq!(state.tick, Tick(6));
        assert_eq!(
            state.peep_spawns.as_slice(),
            &[CoordsXYZD::new(80, 63, 0, 1), CoordsXYZD::new(112, 63, 0, 1)]
        );
    }

    #[test]
    fn replay_stops_before_until() {
        let entries = [logged(1, 0, 32), logged(3, 1, 64)];

        let state = with_env(|env| replay(editor_state(), &entries, env, Tick(3))).unwrap();

        assert_eq!(state.tick, Tick(3));
        assert_eq!(state.peep_spawns.len(), 1);
    }

    #[test]
    fn replay_rejects_reordered_log() {
        let entries = [logged(2, 1, 32), logged(2, 0, 64)];

        let error = with_env(|env| replay(editor_state(), &entries, env, Tick(5))).unwrap_err();

        assert!(matches!(error, ReplayError::OutOfOrder { seq: 0, .. }));
    }

    #[test]
    fn replay_reports_corrupt_frames() {
        let entries = [ActionLogEntry::new(Tick(1), 0, vec![0, 0, 0, 0, 1])];

        let error = with_env(|env| replay(editor_state(), &entries, env, Tick(5))).unwrap_err();

        assert!(matches!(error, ReplayError::Decode { tick: Tick(1), .. }));
    }

    #[test]
    fn failed_entries_leave_state_untouched() {
        // Tick 1 places and tick 2 removes; the off-path entry fails both live and here.
        let entries = [logged(1, 0, 32), logged(2, 1, 5 * 32), logged(2, 2, 32)];

        let state = with_env(|env| replay(editor_state(), &entries, env, Tick(3))).unwrap();

        assert!(state.peep_spawns.is_empty());
    }
}
