//! Deterministic binary codec for commands.
//!
//! # Frame layout
//!
//! All integers are big-endian.
//!
//! ```text
//! u32 action type | u32 network id | u32 command flags | u32 player | parameters...
//! ```
//!
//! Parameters follow the action's descriptor order: `bool` as one byte
//! (`0`/`1`), `u8`, `u16`, `u32`, `i32`. The same frame is used on the wire
//! and inside the action log. Decoding consumes exactly one frame.

mod checksum;
mod error;
mod reader;
mod writer;

pub use checksum::command_checksum;
pub use error::CodecError;
pub use reader::FrameReader;
pub use writer::FrameWriter;

use crate::action::{Action, ActionType, CommandFlags, CommandHeader, GameCommand};
use crate::state::PlayerId;

/// Encodes `command` into a standalone frame.
pub fn encode(command: &GameCommand) -> Vec<u8> {
    let mut writer = FrameWriter::new();
    writer.write_u32(command.action_type().id());
    writer.write_u32(command.header.network_id);
    writer.write_u32(command.header.flags.bits());
    writer.write_u32(command.header.player.0);
    let mut action = command.action.clone();
    let Ok(()) = action.accept_parameters(&mut writer);
    writer.into_bytes()
}

/// Decodes one frame produced by [`encode`].
///
/// # Errors
///
/// Fails on unknown action types, truncated frames, invalid boolean bytes,
/// and bytes left over after the last parameter.
pub fn decode(bytes: &[u8]) -> Result<GameCommand, CodecError> {
    let mut reader = FrameReader::new(bytes);
    let type_id = reader.read_u32("type")?;
    let action_type =
        ActionType::from_id(type_id).ok_or(CodecError::UnknownActionType(type_id))?;
    let network_id = reader.read_u32("network_id")?;
    let flags = CommandFlags::from_bits_truncate(reader.read_u32("flags")?);
    let player = PlayerId(reader.read_u32("player")?);

    let mut action = Action::default_for(action_type);
    action.accept_parameters(&mut reader)?;
    reader.finish()?;

    Ok(GameCommand {
        header: CommandHeader {
            player,
            network_id,
            flags,
        },
        action,
    })
}
