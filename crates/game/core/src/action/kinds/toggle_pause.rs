use crate::action::{
    ActionError, ActionFlags, ActionResult, ActionType, CommandHeader, GameAction,
    ParameterVisitor,
};
use crate::env::GameEnv;
use crate::state::GameState;

/// Flips the session's paused flag. Carries no parameters.
///
/// Not journaled; pausing does not change simulated world state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TogglePauseAction;

impl GameAction for TogglePauseAction {
    const TYPE: ActionType = ActionType::TogglePause;

    fn action_flags() -> ActionFlags {
        ActionFlags::ALLOW_WHILE_PAUSED | ActionFlags::IGNORE_FOR_REPLAYS
    }

    fn accept_parameters<V: ParameterVisitor + ?Sized>(
        &mut self,
        _visitor: &mut V,
    ) -> Result<(), V::Error> {
        Ok(())
    }

    fn query(
        &self,
        _header: &CommandHeader,
        _state: &GameState,
        _env: &GameEnv<'_>,
    ) -> Result<ActionResult, ActionError> {
        Ok(ActionResult::ok())
    }

    fn execute(
        &self,
        _header: &CommandHeader,
        state: &mut GameState,
        _env: &GameEnv<'_>,
    ) -> Result<ActionResult, ActionError> {
        state.session.paused = !state.session.paused;
        Ok(ActionResult::ok())
    }
}
