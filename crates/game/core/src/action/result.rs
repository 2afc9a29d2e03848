//! Structured outcome of an action's query or execution.

use std::collections::BTreeMap;
use std::fmt;

use crate::action::ParamValue;
use crate::state::CoordsXYZ;

/// Outcome classification of a query or execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    #[default]
    Ok,
    /// Structurally or semantically invalid input.
    InvalidParameters,
    /// The issuing participant is not permitted to perform the action.
    Disallowed,
    /// The simulation is paused and the action is not pause-safe.
    GamePaused,
    /// Editor-only action issued outside the editor without sandbox override.
    NotInEditorMode,
    /// The target land is not owned by the park.
    NotOwned,
    /// Element storage is exhausted and could not be compacted.
    NoFreeElements,
    /// An unexpected lookup failure not otherwise classified.
    Unknown,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque message identifier resolved to text by the localisation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StringId(pub u16);

impl StringId {
    pub const CANT_PLACE_PEEP_SPAWN_HERE: Self = Self(1);
    pub const OFF_EDGE_OF_MAP: Self = Self(2);
    pub const CAN_ONLY_BE_BUILT_ACROSS_PATHS: Self = Self(3);
    pub const MUST_BE_OUTSIDE_PARK_BOUNDARIES: Self = Self(4);
    pub const INVALID_DIRECTION: Self = Self(5);
    pub const CANT_CHANGE_GROUP: Self = Self(6);
    pub const PLAYER_NOT_FOUND: Self = Self(7);
    pub const GROUP_NOT_FOUND: Self = Self(8);
    pub const PERMISSION_DENIED: Self = Self(9);
    pub const CANT_CHANGE_HOST_GROUP: Self = Self(10);
    pub const CANT_SET_TO_THIS_GROUP: Self = Self(11);
    pub const ACTION_NOT_ALLOWED: Self = Self(12);
    pub const GAME_PAUSED: Self = Self(13);
    pub const ONLY_IN_EDITOR: Self = Self(14);
    pub const ONLY_HOST: Self = Self(15);
}

/// Finance category an action's cost is booked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExpenditureType {
    LandPurchase,
    Landscaping,
    RideConstruction,
    ParkRunningCosts,
}

/// Outcome of a query or execution.
///
/// A result with [`Status::Ok`] never carries an error message; any other
/// status always carries a primary (title) message. The constructors are the
/// only way to set the status, so the pairing cannot be broken. Decoding
/// checks the same pairing.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "ActionResultRepr")
)]
pub struct ActionResult {
    status: Status,
    error_title: Option<StringId>,
    error_message: Option<StringId>,
    pub expenditure: Option<ExpenditureType>,
    pub cost: i64,
    pub position: Option<CoordsXYZ>,
    pub extra: BTreeMap<String, ParamValue>,
}

impl ActionResult {
    /// Accepted/applied result with no side-channel data.
    pub fn ok() -> Self {
        Self::default()
    }

    /// Rejection with a general failure class (`title`) and optional reason.
    ///
    /// A [`Status::Ok`] passed here is recorded as [`Status::Unknown`].
    pub fn error(status: Status, title: StringId, message: Option<StringId>) -> Self {
        let status = if status.is_ok() {
            Status::Unknown
        } else {
            status
        };
        Self {
            status,
            error_title: Some(title),
            error_message: message,
            ..Self::default()
        }
    }

    pub fn with_expenditure(mut self, expenditure: ExpenditureType) -> Self {
        self.expenditure = Some(expenditure);
        self
    }

    pub fn with_position(mut self, position: CoordsXYZ) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_cost(mut self, cost: i64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    pub fn error_title(&self) -> Option<StringId> {
        self.error_title
    }

    pub fn error_message(&self) -> Option<StringId> {
        self.error_message
    }
}

/// Decoded result whose status/message pairing has been broken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidActionResult {
    #[error("ok result carries an error message")]
    OkWithMessage,

    #[error("{0} result has no error title")]
    MissingTitle(Status),
}

/// Wire shape of [`ActionResult`], validated before it becomes one.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct ActionResultRepr {
    status: Status,
    error_title: Option<StringId>,
    error_message: Option<StringId>,
    expenditure: Option<ExpenditureType>,
    cost: i64,
    position: Option<CoordsXYZ>,
    extra: BTreeMap<String, ParamValue>,
}

#[cfg(feature = "serde")]
impl TryFrom<ActionResultRepr> for ActionResult {
    type Error = InvalidActionResult;

    fn try_from(repr: ActionResultRepr) -> Result<Self, Self::Error> {
        match (repr.status.is_ok(), repr.error_title, repr.error_message) {
            (true, None, None) | (false, Some(_), _) => Ok(Self {
                status: repr.status,
                error_title: repr.error_title,
                error_message: repr.error_message,
                expenditure: repr.expenditure,
                cost: repr.cost,
                position: repr.position,
                extra: repr.extra,
            }),
            (true, _, _) => Err(InvalidActionResult::OkWithMessage),
            (false, None, _) => Err(InvalidActionResult::MissingTitle(repr.status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_result_has_no_messages() {
        let result = ActionResult::ok().with_position(CoordsXYZ::new(1, 2, 3));
        assert!(result.is_ok());
        assert_eq!(result.error_title(), None);
        assert_eq!(result.error_message(), None);
    }

    #[test]
    fn error_result_keeps_title_and_detail() {
        let result = ActionResult::error(
            Status::InvalidParameters,
            StringId::CANT_PLACE_PEEP_SPAWN_HERE,
            Some(StringId::OFF_EDGE_OF_MAP),
        );
        assert_eq!(result.status(), Status::InvalidParameters);
        assert_eq!(result.error_title(), Some(StringId::CANT_PLACE_PEEP_SPAWN_HERE));
        assert_eq!(result.error_message(), Some(StringId::OFF_EDGE_OF_MAP));
    }

    #[test]
    fn error_constructor_never_yields_ok() {
        let result = ActionResult::error(Status::Ok, StringId::ACTION_NOT_ALLOWED, None);
        assert!(!result.is_ok());
        assert_eq!(result.status(), Status::Unknown);
        assert_eq!(result.error_title(), Some(StringId::ACTION_NOT_ALLOWED));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn decoding_enforces_status_message_pairing() {
        let valid = ActionResult::error(
            Status::Disallowed,
            StringId::CANT_CHANGE_GROUP,
            Some(StringId::PERMISSION_DENIED),
        );
        let json = serde_json::to_string(&valid).unwrap();
        assert_eq!(serde_json::from_str::<ActionResult>(&json).unwrap(), valid);

        let ok_with_message = json.replace("\"Disallowed\"", "\"Ok\"");
        let error = serde_json::from_str::<ActionResult>(&ok_with_message).unwrap_err();
        assert!(error.to_string().contains("ok result carries an error message"));

        let untitled = serde_json::to_string(&ActionResult::ok())
            .unwrap()
            .replace("\"Ok\"", "\"NotOwned\"");
        let error = serde_json::from_str::<ActionResult>(&untitled).unwrap_err();
        assert!(error.to_string().contains("not_owned result has no error title"));
    }

    #[test]
    fn status_names_are_snake_case() {
        assert_eq!(Status::NotInEditorMode.as_str(), "not_in_editor_mode");
        assert_eq!(Status::Ok.to_string(), "ok");
    }
}
