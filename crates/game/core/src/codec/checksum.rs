use sha2::{Digest, Sha256};

use crate::action::{GameCommand, ParamSlot, ParameterVisitor};

use core::convert::Infallible;

/// Feeds visited fields into a SHA-256 digest.
///
/// Names are hashed alongside values, so two actions whose parameter bytes
/// coincide but whose descriptors differ still hash apart.
struct DigestVisitor {
    hasher: Sha256,
}

impl ParameterVisitor for DigestVisitor {
    type Error = Infallible;

    fn visit(&mut self, name: &'static str, slot: ParamSlot<'_>) -> Result<(), Infallible> {
        self.hasher.update(name.as_bytes());
        match slot {
            ParamSlot::Bool(v) => self.hasher.update([u8::from(*v)]),
            ParamSlot::U8(v) => self.hasher.update([*v]),
            ParamSlot::U16(v) => self.hasher.update(v.to_be_bytes()),
            ParamSlot::U32(v) => self.hasher.update(v.to_be_bytes()),
            ParamSlot::I32(v) => self.hasher.update(v.to_be_bytes()),
        }
        Ok(())
    }
}

/// Checksum of a command's action type and parameters.
///
/// The header is excluded: the same action issued by two participants hashes
/// equal.
pub fn command_checksum(command: &GameCommand) -> [u8; 32] {
    let mut visitor = DigestVisitor {
        hasher: Sha256::new(),
    };
    visitor
        .hasher
        .update(command.action_type().id().to_be_bytes());
    let mut action = command.action.clone();
    let Ok(()) = action.accept_parameters(&mut visitor);
    visitor.hasher.finalize().into()
}
