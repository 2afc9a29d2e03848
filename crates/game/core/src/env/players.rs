use crate::action::ActionResult;
use crate::state::{GroupId, PlayerId};

/// Authoritative player/permission-group store of a session.
///
/// The store belongs to the session layer; actions only invoke it. The same
/// call serves both phases of an action: with `commit = false` it must only
/// validate, with `commit = true` it validates and applies the change.
pub trait PlayerRegistry: Send + Sync {
    fn set_player_group(
        &self,
        invoker: PlayerId,
        target: PlayerId,
        group: GroupId,
        commit: bool,
    ) -> ActionResult;
}
