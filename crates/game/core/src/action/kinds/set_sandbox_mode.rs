use crate::action::{
    ActionError, ActionFlags, ActionResult, ActionType, CommandHeader, GameAction, ParamSlot,
    ParameterVisitor,
};
use crate::env::GameEnv;
use crate::state::GameState;

/// Turns the sandbox cheat on or off.
///
/// With sandbox enabled, editor-only actions are admissible during play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SetSandboxModeAction {
    pub enabled: bool,
}

impl SetSandboxModeAction {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl GameAction for SetSandboxModeAction {
    const TYPE: ActionType = ActionType::SetSandboxMode;

    fn action_flags() -> ActionFlags {
        ActionFlags::ALLOW_WHILE_PAUSED | ActionFlags::REQUIRES_NETWORK_AUTHORITY
    }

    fn accept_parameters<V: ParameterVisitor + ?Sized>(
        &mut self,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        visitor.visit("enabled", ParamSlot::Bool(&mut self.enabled))
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
        state.session.sandbox = self.enabled;
        Ok(ActionResult::ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{GameCommand, ParamValue};

    #[test]
    fn sets_flag_and_exposes_parameter() {
        let env = GameEnv::empty();
        let mut state = GameState::default();
        let command = GameCommand::new(SetSandboxModeAction::new(true));

        command.execute(&mut state, &env).unwrap();

        assert!(state.session.sandbox);
        assert!(state.session.allows_editor_actions());
        assert_eq!(command.parameters().get("enabled"), Some(ParamValue::Bool(true)));
    }
}
