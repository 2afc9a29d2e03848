//! Game actions: the only way simulation state changes.
//!
//! # Contract
//!
//! Every concrete action implements [`GameAction`]:
//! - `accept_parameters`: single field traversal used by the codec, checksum and
//!   inspection visitors (see [`params`])
//! - `query`: validates against current state without mutating anything
//! - `execute`: applies the mutation, assuming a query on the same state passed
//!
//! [`Action`] is the closed set of catalogue variants and [`GameCommand`] pairs
//! one with the framework-owned [`CommandHeader`]. `GameCommand::execute`
//! always re-runs the query against the state it is about to mutate, so a stale
//! precondition fails cleanly and leaves state untouched.
//!
//! # Module Structure
//!
//! - `error`: fatal action errors (`ActionError`)
//! - `flags`: `ActionFlags`, `CommandFlags`, `Permission`
//! - `params`: parameter descriptor visitors
//! - `result`: `ActionResult`, `Status`, `StringId`
//! - `kinds`: the action catalogue

pub mod error;
pub mod flags;
pub mod kinds;
pub mod params;
pub mod result;

pub use error::ActionError;
pub use flags::{ActionFlags, CommandFlags, Permission};
pub use kinds::{PlacePeepSpawnAction, SetPlayerGroupAction, SetSandboxModeAction, TogglePauseAction};
pub use params::{ParamSlot, ParamValue, ParameterCollector, ParameterSet, ParameterVisitor};
pub use result::{ActionResult, ExpenditureType, InvalidActionResult, Status, StringId};

use crate::env::GameEnv;
use crate::state::{GameState, PlayerId};

/// Behaviour every catalogue action provides.
pub trait GameAction: Clone + core::fmt::Debug + Default + PartialEq {
    /// Stable wire identifier of this action kind.
    const TYPE: ActionType;

    /// Static traits of the action type. Baseline is empty.
    fn action_flags() -> ActionFlags {
        ActionFlags::empty()
    }

    /// Exposes every parameter to `visitor` in a fixed order.
    ///
    /// Must not touch anything but the visited fields.
    fn accept_parameters<V: ParameterVisitor + ?Sized>(
        &mut self,
        visitor: &mut V,
    ) -> Result<(), V::Error>;

    /// Validates preconditions. Must not mutate state or any collaborator.
    fn query(
        &self,
        header: &CommandHeader,
        state: &GameState,
        env: &GameEnv<'_>,
    ) -> Result<ActionResult, ActionError>;

    /// Applies the action. Callers go through [`GameCommand::execute`], which
    /// re-queries first.
    fn execute(
        &self,
        header: &CommandHeader,
        state: &mut GameState,
        env: &GameEnv<'_>,
    ) -> Result<ActionResult, ActionError>;
}

/// Stable numeric identifier of an action kind (first field on the wire).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::FromRepr,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
#[repr(u32)]
pub enum ActionType {
    PlacePeepSpawn = 0,
    SetPlayerGroup = 1,
    TogglePause = 2,
    SetSandboxMode = 3,
}

impl ActionType {
    pub const fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::from_repr(id)
    }

    /// Returns the snake_case name, used for logging and inspection.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn flags(self) -> ActionFlags {
        match self {
            ActionType::PlacePeepSpawn => PlacePeepSpawnAction::action_flags(),
            ActionType::SetPlayerGroup => SetPlayerGroupAction::action_flags(),
            ActionType::TogglePause => TogglePauseAction::action_flags(),
            ActionType::SetSandboxMode => SetSandboxModeAction::action_flags(),
        }
    }

    /// Permission a non-host participant needs to issue this action.
    pub fn required_permission(self) -> Permission {
        match self {
            ActionType::PlacePeepSpawn => Permission::PARK_PROPERTIES,
            ActionType::SetPlayerGroup => Permission::MODIFY_GROUPS,
            ActionType::TogglePause => Permission::TOGGLE_PAUSE,
            ActionType::SetSandboxMode => Permission::CHEAT,
        }
    }
}

/// Closed set of catalogue actions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    PlacePeepSpawn(PlacePeepSpawnAction),
    SetPlayerGroup(SetPlayerGroupAction),
    TogglePause(TogglePauseAction),
    SetSandboxMode(SetSandboxModeAction),
}

impl Action {
    /// Blank instance of `action_type`, ready to be filled by a decoder.
    pub fn default_for(action_type: ActionType) -> Self {
        match action_type {
            ActionType::PlacePeepSpawn => Action::PlacePeepSpawn(Default::default()),
            ActionType::SetPlayerGroup => Action::SetPlayerGroup(Default::default()),
            ActionType::TogglePause => Action::TogglePause(Default::default()),
            ActionType::SetSandboxMode => Action::SetSandboxMode(Default::default()),
        }
    }

    pub fn action_type(&self) -> ActionType {
        match self {
            Action::PlacePeepSpawn(_) => PlacePeepSpawnAction::TYPE,
            Action::SetPlayerGroup(_) => SetPlayerGroupAction::TYPE,
            Action::TogglePause(_) => TogglePauseAction::TYPE,
            Action::SetSandboxMode(_) => SetSandboxModeAction::TYPE,
        }
    }

    pub fn flags(&self) -> ActionFlags {
        self.action_type().flags()
    }

    pub fn accept_parameters<V: ParameterVisitor + ?Sized>(
        &mut self,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        match self {
            Action::PlacePeepSpawn(action) => action.accept_parameters(visitor),
            Action::SetPlayerGroup(action) => action.accept_parameters(visitor),
            Action::TogglePause(action) => action.accept_parameters(visitor),
            Action::SetSandboxMode(action) => action.accept_parameters(visitor),
        }
    }

    /// Ordered name/value view of the parameters.
    pub fn parameters(&self) -> ParameterSet {
        let mut collector = ParameterCollector::new();
        let mut copy = self.clone();
        let Ok(()) = copy.accept_parameters(&mut collector);
        collector.finish()
    }

    fn query(
        &self,
        header: &CommandHeader,
        state: &GameState,
        env: &GameEnv<'_>,
    ) -> Result<ActionResult, ActionError> {
        match self {
            Action::PlacePeepSpawn(action) => action.query(header, state, env),
            Action::SetPlayerGroup(action) => action.query(header, state, env),
            Action::TogglePause(action) => action.query(header, state, env),
            Action::SetSandboxMode(action) => action.query(header, state, env),
        }
    }

    fn execute(
        &self,
        header: &CommandHeader,
        state: &mut GameState,
        env: &GameEnv<'_>,
    ) -> Result<ActionResult, ActionError> {
        match self {
            Action::PlacePeepSpawn(action) => action.execute(header, state, env),
            Action::SetPlayerGroup(action) => action.execute(header, state, env),
            Action::TogglePause(action) => action.execute(header, state, env),
            Action::SetSandboxMode(action) => action.execute(header, state, env),
        }
    }
}

impl From<PlacePeepSpawnAction> for Action {
    fn from(action: PlacePeepSpawnAction) -> Self {
        Self::PlacePeepSpawn(action)
    }
}

impl From<SetPlayerGroupAction> for Action {
    fn from(action: SetPlayerGroupAction) -> Self {
        Self::SetPlayerGroup(action)
    }
}

impl From<TogglePauseAction> for Action {
    fn from(action: TogglePauseAction) -> Self {
        Self::TogglePause(action)
    }
}

impl From<SetSandboxModeAction> for Action {
    fn from(action: SetSandboxModeAction) -> Self {
        Self::SetSandboxMode(action)
    }
}

/// Envelope fields owned by the framework rather than the action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandHeader {
    /// Participant that issued the command.
    pub player: PlayerId,
    /// Issuer-local sequence number used to route results back.
    pub network_id: u32,
    pub flags: CommandFlags,
}

/// An action instance together with its header; the unit that gets
/// validated, transmitted, and applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameCommand {
    pub header: CommandHeader,
    pub action: Action,
}

impl GameCommand {
    pub fn new(action: impl Into<Action>) -> Self {
        Self {
            header: CommandHeader::default(),
            action: action.into(),
        }
    }

    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.header.player = player;
        self
    }

    pub fn with_flags(mut self, flags: CommandFlags) -> Self {
        self.header.flags = flags;
        self
    }

    pub fn action_type(&self) -> ActionType {
        self.action.action_type()
    }

    pub fn flags(&self) -> ActionFlags {
        self.action.flags()
    }

    pub fn parameters(&self) -> ParameterSet {
        self.action.parameters()
    }

    /// Validates the command against `state` without side effects.
    pub fn query(&self, state: &GameState, env: &GameEnv<'_>) -> Result<ActionResult, ActionError> {
        self.action.query(&self.header, state, env)
    }

    /// Re-validates against `state` and, only if that passes, applies.
    ///
    /// A non-Ok query result is returned unchanged and `state` is not touched.
    pub fn execute(
        &self,
        state: &mut GameState,
        env: &GameEnv<'_>,
    ) -> Result<ActionResult, ActionError> {
        let validation = self.action.query(&self.header, state, env)?;
        if !validation.is_ok() {
            return Ok(validation);
        }
        self.action.execute(&self.header, state, env)
    }
}
