//! Authoritative player and permission-group store of a session.
//!
//! [`SessionRegistry`] backs the [`PlayerRegistry`] collaborator that
//! group-changing actions call, and answers the permission checks the
//! dispatcher runs during admission.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use game_core::{ActionResult, GroupId, Permission, PlayerId, PlayerRegistry, Status, StringId};

/// A named set of permissions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGroup {
    pub name: String,
    pub permissions: Permission,
}

/// Serializable contents of a [`SessionRegistry`].
///
/// Sent to joining peers with the state snapshot and to everyone when
/// membership changes.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Roster {
    pub players: BTreeMap<PlayerId, GroupId>,
    pub groups: BTreeMap<GroupId, PermissionGroup>,
    /// Group assigned to peers when they join.
    pub default_group: GroupId,
}

impl Roster {
    pub const ADMIN_GROUP: GroupId = GroupId(0);
    pub const GUEST_GROUP: GroupId = GroupId(1);

    /// Admin and guest groups with the host in the admin group.
    pub fn with_default_groups() -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(
            Self::ADMIN_GROUP,
            PermissionGroup {
                name: "Admin".to_string(),
                permissions: Permission::all(),
            },
        );
        groups.insert(
            Self::GUEST_GROUP,
            PermissionGroup {
                name: "Guest".to_string(),
                permissions: Permission::TOGGLE_PAUSE,
            },
        );

        let mut players = BTreeMap::new();
        players.insert(PlayerId::HOST, Self::ADMIN_GROUP);

        Self {
            players,
            groups,
            default_group: Self::GUEST_GROUP,
        }
    }

    fn permissions_of(&self, player: PlayerId) -> Permission {
        if player.is_host() {
            return Permission::all();
        }
        self.players
            .get(&player)
            .and_then(|group| self.groups.get(group))
            .map(|group| group.permissions)
            .unwrap_or_else(Permission::empty)
    }

    fn check_group_change(
        &self,
        invoker: PlayerId,
        target: PlayerId,
        group: GroupId,
    ) -> Result<(), ActionResult> {
        let reject = |status, message| {
            Err(ActionResult::error(
                status,
                StringId::CANT_CHANGE_GROUP,
                Some(message),
            ))
        };

        if !self.players.contains_key(&target) {
            return reject(Status::InvalidParameters, StringId::PLAYER_NOT_FOUND);
        }
        if !self.groups.contains_key(&group) {
            return reject(Status::InvalidParameters, StringId::GROUP_NOT_FOUND);
        }
        if !self.permissions_of(invoker).contains(Permission::MODIFY_GROUPS) {
            return reject(Status::Disallowed, StringId::PERMISSION_DENIED);
        }
        if target.is_host() {
            return reject(Status::Disallowed, StringId::CANT_CHANGE_HOST_GROUP);
        }
        if !invoker.is_host() && self.players.get(&invoker) != Some(&group) {
            return reject(Status::Disallowed, StringId::CANT_SET_TO_THIS_GROUP);
        }
        Ok(())
    }
}

/// Thread-safe [`Roster`] shared by the dispatcher and the action environment.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    roster: RwLock<Roster>,
}

impl SessionRegistry {
    pub fn new(roster: Roster) -> Self {
        Self {
            roster: RwLock::new(roster),
        }
    }

    pub fn with_default_groups() -> Self {
        Self::new(Roster::with_default_groups())
    }

    /// Adds `player` to `group`, or to the default group when `None`.
    pub fn add_player(&self, player: PlayerId, group: Option<GroupId>) {
        let mut roster = self.write();
        let group = group.unwrap_or(roster.default_group);
        roster.players.insert(player, group);
    }

    pub fn remove_player(&self, player: PlayerId) -> bool {
        self.write().players.remove(&player).is_some()
    }

    pub fn add_group(&self, id: GroupId, name: impl Into<String>, permissions: Permission) {
        self.write().groups.insert(
            id,
            PermissionGroup {
                name: name.into(),
                permissions,
            },
        );
    }

    pub fn group_of(&self, player: PlayerId) -> Option<GroupId> {
        self.read().players.get(&player).copied()
    }

    /// Effective permissions of `player`. The host holds every permission;
    /// unknown players hold none.
    pub fn permissions_of(&self, player: PlayerId) -> Permission {
        self.read().permissions_of(player)
    }

    pub fn snapshot(&self) -> Roster {
        self.read().clone()
    }

    pub fn restore(&self, roster: Roster) {
        *self.write() = roster;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Roster> {
        self.roster.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Roster> {
        self.roster.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PlayerRegistry for SessionRegistry {
    fn set_player_group(
        &self,
        invoker: PlayerId,
        target: PlayerId,
        group: GroupId,
        commit: bool,
    ) -> ActionResult {
        if !commit {
            return match self.read().check_group_change(invoker, target, group) {
                Ok(()) => ActionResult::ok(),
                Err(rejection) => rejection,
            };
        }

        // Check and apply under one write lock.
        let mut roster = self.write();
        if let Err(rejection) = roster.check_group_change(invoker, target, group) {
            return rejection;
        }
        roster.players.insert(target, group);
        ActionResult::ok()
    }
}
