//! Deterministic game-action framework and world state shared by every
//! participant of a session.
//!
//! `game-core` defines how world mutations are described, validated, encoded
//! and applied: the parameter descriptor, results and flags, the wire codec,
//! the two-phase query/execute contract and the action catalogue. It performs
//! no I/O; sequencing and replication live in `game-runtime`.
pub mod action;
pub mod codec;
pub mod config;
pub mod env;
pub mod error;
pub mod state;

pub use action::{
    Action, ActionError, ActionFlags, ActionResult, ActionType, CommandFlags, CommandHeader,
    ExpenditureType, GameAction, GameCommand, InvalidActionResult, ParamSlot, ParamValue,
    ParameterSet, ParameterVisitor, Permission, PlacePeepSpawnAction, SetPlayerGroupAction,
    SetSandboxModeAction, Status, StringId, TogglePauseAction,
};
pub use codec::{CodecError, command_checksum, decode, encode};
pub use config::GameConfig;
pub use env::{
    Env, GameEnv, MapOracle, OracleError, Ownership, PlayerRegistry, RecordingInvalidator,
    TileInvalidator, TileMap,
};
pub use error::{ErrorSeverity, GameError};
pub use state::{
    CoordsXY, CoordsXYZ, CoordsXYZD, GameState, GroupId, PeepSpawn, PeepSpawns, PlayerId,
    ScreenMode, SessionState, Tick, TileCoordsXYZ,
};
