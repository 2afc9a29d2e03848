//! Flag-derived admission checks run before an action's own query.

use game_core::{ActionFlags, ActionResult, GameCommand, PlayerId, SessionState, Status, StringId};

use super::SessionRole;
use crate::registry::SessionRegistry;

/// Decides whether `command` from `origin` may be considered at all.
///
/// Checks, in order: editor mode, pause, network authority, group
/// permission. Only the type's flags and the session mode are consulted;
/// parameters are never looked at.
pub fn admit(
    command: &GameCommand,
    origin: PlayerId,
    session: &SessionState,
    role: SessionRole,
    registry: &SessionRegistry,
) -> Result<(), ActionResult> {
    let flags = command.flags();
    let deny = |status, detail| {
        Err(ActionResult::error(
            status,
            StringId::ACTION_NOT_ALLOWED,
            Some(detail),
        ))
    };

    if flags.contains(ActionFlags::EDITOR_ONLY) && !session.allows_editor_actions() {
        return deny(Status::NotInEditorMode, StringId::ONLY_IN_EDITOR);
    }
    if session.paused && !flags.contains(ActionFlags::ALLOW_WHILE_PAUSED) {
        return deny(Status::GamePaused, StringId::GAME_PAUSED);
    }
    if !role.is_networked() || origin.is_host() {
        return Ok(());
    }
    if flags.contains(ActionFlags::REQUIRES_NETWORK_AUTHORITY) {
        return deny(Status::Disallowed, StringId::ONLY_HOST);
    }
    let required = command.action_type().required_permission();
    if !registry.permissions_of(origin).contains(required) {
        return deny(Status::Disallowed, StringId::PERMISSION_DENIED);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{
        CoordsXYZD, PlacePeepSpawnAction, ScreenMode, SetSandboxModeAction, TogglePauseAction,
    };

    fn spawn() -> GameCommand {
        GameCommand::new(PlacePeepSpawnAction::new(CoordsXYZD::new(32, 32, 0, 0)))
    }

    fn rejection(result: Result<(), ActionResult>) -> (Status, Option<StringId>) {
        let result = result.unwrap_err();
        (result.status(), result.error_message())
    }

    #[test]
    fn editor_gate_comes_first() {
        let registry = SessionRegistry::with_default_groups();
        let mut session = SessionState::new(ScreenMode::Playing);
        session.paused = true;

        let outcome = admit(&spawn(), PlayerId(5), &session, SessionRole::Client, &registry);

        assert_eq!(
            rejection(outcome),
            (Status::NotInEditorMode, Some(StringId::ONLY_IN_EDITOR))
        );
    }

    #[test]
    fn pause_safe_actions_pass_while_paused() {
        let registry = SessionRegistry::with_default_groups();
        let mut session = SessionState::new(ScreenMode::ScenarioEditor);
        session.paused = true;

        assert!(admit(&spawn(), PlayerId::HOST, &session, SessionRole::Local, &registry).is_ok());
        assert!(
            admit(
                &GameCommand::new(TogglePauseAction),
                PlayerId::HOST,
                &session,
                SessionRole::Local,
                &registry
            )
            .is_ok()
        );
    }

    #[test]
    fn authority_and_permissions_apply_only_to_networked_peers() {
        let registry = SessionRegistry::with_default_groups();
        registry.add_player(PlayerId(3), None);
        let session = SessionState::new(ScreenMode::ScenarioEditor);
        let sandbox = GameCommand::new(SetSandboxModeAction::new(true));

        assert!(admit(&sandbox, PlayerId(3), &session, SessionRole::Local, &registry).is_ok());
        assert!(admit(&sandbox, PlayerId::HOST, &session, SessionRole::Host, &registry).is_ok());
        assert_eq!(
            rejection(admit(&sandbox, PlayerId(3), &session, SessionRole::Host, &registry)),
            (Status::Disallowed, Some(StringId::ONLY_HOST))
        );
        assert_eq!(
            rejection(admit(&spawn(), PlayerId(3), &session, SessionRole::Host, &registry)),
            (Status::Disallowed, Some(StringId::PERMISSION_DENIED))
        );
        assert!(
            admit(
                &GameCommand::new(TogglePauseAction),
                PlayerId(3),
                &session,
                SessionRole::Host,
                &registry
            )
            .is_ok()
        );
    }
}
