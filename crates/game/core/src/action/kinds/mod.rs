//! Action catalogue.
//!
//! Each action is a thin consumer of the framework: a parameter list, a set of
//! static flags, a side-effect-free query and a mutating execute.
mod place_peep_spawn;
mod set_player_group;
mod set_sandbox_mode;
mod toggle_pause;

pub use place_peep_spawn::PlacePeepSpawnAction;
pub use set_player_group::SetPlayerGroupAction;
pub use set_sandbox_mode::SetSandboxModeAction;
pub use toggle_pause::TogglePauseAction;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::action::{ActionResult, Status, StringId};
    use crate::env::PlayerRegistry;
    use crate::state::{GroupId, PlayerId};

    /// Registry that accepts every change and never commits anything.
    #[derive(Debug, Default)]
    pub struct AcceptAllRegistry;

    impl PlayerRegistry for AcceptAllRegistry {
        fn set_player_group(
            &self,
            _invoker: PlayerId,
            target: PlayerId,
            _group: GroupId,
            _commit: bool,
        ) -> ActionResult {
            if target.is_none() {
                ActionResult::error(
                    Status::InvalidParameters,
                    StringId::CANT_CHANGE_GROUP,
                    Some(StringId::PLAYER_NOT_FOUND),
                )
            } else {
                ActionResult::ok()
            }
        }
    }
}
