use crate::action::{
    ActionError, ActionFlags, ActionResult, ActionType, CommandHeader, GameAction,
    ParameterVisitor,
};
use crate::env::GameEnv;
use crate::state::{GameState, GroupId, PlayerId};

/// Moves a participant into another permission group.
///
/// All validation lives in the session's [`PlayerRegistry`]; the action only
/// forwards the issuer, target and group, once to check and once to commit.
///
/// [`PlayerRegistry`]: crate::env::PlayerRegistry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SetPlayerGroupAction {
    pub player: PlayerId,
    pub group: GroupId,
}

impl SetPlayerGroupAction {
    pub fn new(player: PlayerId, group: GroupId) -> Self {
        Self { player, group }
    }
}

impl GameAction for SetPlayerGroupAction {
    const TYPE: ActionType = ActionType::SetPlayerGroup;

    fn action_flags() -> ActionFlags {
        ActionFlags::ALLOW_WHILE_PAUSED
    }

    fn accept_parameters<V: ParameterVisitor + ?Sized>(
        &mut self,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        visitor.visit_player("playerId", &mut self.player)?;
        visitor.visit_group("groupId", &mut self.group)
    }

    fn query(
        &self,
        header: &CommandHeader,
        _state: &GameState,
        env: &GameEnv<'_>,
    ) -> Result<ActionResult, ActionError> {
        let registry = env.players()?;
        Ok(registry.set_player_group(header.player, self.player, self.group, false))
    }

    fn execute(
        &self,
        header: &CommandHeader,
        _state: &mut GameState,
        env: &GameEnv<'_>,
    ) -> Result<ActionResult, ActionError> {
        let registry = env.players()?;
        Ok(registry.set_player_group(header.player, self.player, self.group, true))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::action::{GameCommand, ParamValue, Status, StringId};
    use crate::env::{PlayerRegistry, RecordingInvalidator, TileMap};

    #[derive(Default)]
    struct CallLog {
        calls: Mutex<Vec<(PlayerId, PlayerId, GroupId, bool)>>,
    }

    impl PlayerRegistry for CallLog {
        fn set_player_group(
            &self,
            invoker: PlayerId,
            target: PlayerId,
            group: GroupId,
            commit: bool,
        ) -> ActionResult {
            self.calls.lock().unwrap().push((invoker, target, group, commit));
            if group == GroupId::INVALID {
                ActionResult::error(
                    Status::InvalidParameters,
                    StringId::CANT_CHANGE_GROUP,
                    Some(StringId::GROUP_NOT_FOUND),
                )
            } else {
                ActionResult::ok()
            }
        }
    }

    #[test]
    fn parameters_are_named_and_ordered() {
        let command = GameCommand::new(SetPlayerGroupAction::new(PlayerId(3), GroupId(1)));
        let params = command.parameters();

        assert_eq!(params.names().collect::<Vec<_>>(), ["playerId", "groupId"]);
        assert_eq!(params.get("playerId"), Some(ParamValue::U32(3)));
        assert_eq!(params.get("groupId"), Some(ParamValue::U8(1)));
    }

    #[test]
    fn execute_checks_then_commits_as_issuer() {
        let map = TileMap::new(16);
        let registry = CallLog::default();
        let invalidator = RecordingInvalidator::new();
        let env = GameEnv::with_all(&map, &registry, &invalidator);
        let mut state = GameState::default();

        let command = GameCommand::new(SetPlayerGroupAction::new(PlayerId(2), GroupId(1)))
            .with_player(PlayerId(5));
        let result = command.execute(&mut state, &env).unwrap();

        assert!(result.is_ok());
        assert_eq!(
            *registry.calls.lock().unwrap(),
            vec![
                (PlayerId(5), PlayerId(2), GroupId(1), false),
                (PlayerId(5), PlayerId(2), GroupId(1), true),
            ]
        );
    }

    #[test]
    fn registry_rejection_skips_commit() {
        let map = TileMap::new(16);
        let registry = CallLog::default();
        let invalidator = RecordingInvalidator::new();
        let env = GameEnv::with_all(&map, &registry, &invalidator);
        let mut state = GameState::default();

        let command = GameCommand::new(SetPlayerGroupAction::new(PlayerId(2), GroupId::INVALID));
        let result = command.execute(&mut state, &env).unwrap();

        assert_eq!(result.error_message(), Some(StringId::GROUP_NOT_FOUND));
        assert_eq!(registry.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn default_targets_nobody() {
        let action = SetPlayerGroupAction::default();
        assert!(action.player.is_none());
        assert_eq!(action.group, GroupId::INVALID);
    }
}
