//! Peep spawn placement.
//!
//! Places (or removes, when the tile already has one) a guest entry point on
//! a footpath outside the park boundary.

use crate::action::{
    ActionError, ActionFlags, ActionResult, ActionType, CommandHeader, ExpenditureType,
    GameAction, ParameterVisitor, Status, StringId,
};
use crate::config::GameConfig;
use crate::env::{GameEnv, Ownership};
use crate::state::{CoordsXYZD, GameState, PeepSpawn, TileCoordsXYZ, direction_offset};

/// Toggles a peep spawn at `location`.
///
/// # Invariants
///
/// - At most [`GameConfig::MAX_PEEP_SPAWNS`] spawns exist; the oldest is evicted
/// - Placing on a tile that already holds a spawn removes it, whatever the direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PlacePeepSpawnAction {
    pub location: CoordsXYZD,
}

impl PlacePeepSpawnAction {
    pub fn new(location: CoordsXYZD) -> Self {
        Self { location }
    }

    fn reject(status: Status, message: Option<StringId>) -> ActionResult {
        ActionResult::error(status, StringId::CANT_PLACE_PEEP_SPAWN_HERE, message)
    }

    fn accepted(&self) -> ActionResult {
        ActionResult::ok()
            .with_expenditure(ExpenditureType::LandPurchase)
            .with_position(self.location.xyz())
    }
}

impl GameAction for PlacePeepSpawnAction {
    const TYPE: ActionType = ActionType::PlacePeepSpawn;

    fn action_flags() -> ActionFlags {
        ActionFlags::EDITOR_ONLY | ActionFlags::ALLOW_WHILE_PAUSED
    }

    fn accept_parameters<V: ParameterVisitor + ?Sized>(
        &mut self,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        visitor.visit_location(&mut self.location)
    }

    fn query(
        &self,
        _header: &CommandHeader,
        state: &GameState,
        env: &GameEnv<'_>,
    ) -> Result<ActionResult, ActionError> {
        if !state.session.allows_editor_actions() {
            return Ok(Self::reject(Status::NotInEditorMode, None));
        }

        let map = env.map()?;
        if !map.check_free_elements(GameConfig::PEEP_SPAWN_FREE_ELEMENTS) {
            return Ok(Self::reject(Status::NoFreeElements, None));
        }

        let location = self.location;
        let upper = map.size_units() - GameConfig::MAP_EDGE_MARGIN;
        if !map.location_valid(location.xy())
            || location.x <= GameConfig::MAP_EDGE_MARGIN
            || location.y <= GameConfig::MAP_EDGE_MARGIN
            || location.x >= upper
            || location.y >= upper
        {
            return Ok(Self::reject(
                Status::InvalidParameters,
                Some(StringId::OFF_EDGE_OF_MAP),
            ));
        }

        if direction_offset(location.direction).is_none() {
            return Ok(Self::reject(
                Status::InvalidParameters,
                Some(StringId::INVALID_DIRECTION),
            ));
        }

        if !map.has_path_at(TileCoordsXYZ::from(location)) {
            return Ok(Self::reject(
                Status::InvalidParameters,
                Some(StringId::CAN_ONLY_BE_BUILT_ACROSS_PATHS),
            ));
        }

        match map.surface_ownership(location.xy()) {
            None => Ok(Self::reject(Status::Unknown, None)),
            Some(Ownership::Unowned) => Ok(self.accepted()),
            Some(_) => Ok(Self::reject(
                Status::InvalidParameters,
                Some(StringId::MUST_BE_OUTSIDE_PARK_BOUNDARIES),
            )),
        }
    }

    fn execute(
        &self,
        _header: &CommandHeader,
        state: &mut GameState,
        env: &GameEnv<'_>,
    ) -> Result<ActionResult, ActionError> {
        let location = self.location;
        let Some(offset) = direction_offset(location.direction) else {
            return Ok(Self::reject(
                Status::InvalidParameters,
                Some(StringId::INVALID_DIRECTION),
            ));
        };

        // Shift the spawn from the tile centre towards the edge it faces.
        let position =
            location.xy().to_tile_centre() + offset.scaled(GameConfig::PEEP_SPAWN_INSET);
        let spawn = PeepSpawn::new(position.x, position.y, location.z, location.direction);

        if let Some(index) = state.peep_spawns.position_on_tile(spawn.xyz()) {
            state.peep_spawns.remove(index);
            env.invalidate_tile(spawn.xy());
            return Ok(self.accepted());
        }

        if let Some(evicted) = state.peep_spawns.push_evicting_oldest(spawn) {
            env.invalidate_tile(evicted.xy());
        }
        env.invalidate_tile(location.xy());

        Ok(self.accepted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::GameCommand;
    use crate::action::kinds::test_support::AcceptAllRegistry;
    use crate::env::{RecordingInvalidator, TileMap};
    use crate::state::{CoordsXY, ScreenMode, SessionState};

    fn editor_state() -> GameState {
        GameState::new(SessionState::new(ScreenMode::ScenarioEditor))
    }

    fn map_with_paths(tiles: &[(i32, i32)]) -> TileMap {
        tiles.iter().fold(TileMap::new(64), |map, &(x, y)| {
            map.with_path(TileCoordsXYZ::new(x, y, 0))
        })
    }

    fn place(x: i32, y: i32, direction: u8) -> GameCommand {
        GameCommand::new(PlacePeepSpawnAction::new(CoordsXYZD::new(x, y, 0, direction)))
    }

    #[test]
    fn placing_twice_on_same_tile_toggles() {
        let map = map_with_paths(&[(1, 1)]);
        let registry = AcceptAllRegistry;
        let invalidator = RecordingInvalidator::new();
        let env = GameEnv::with_all(&map, &registry, &invalidator);
        let mut state = editor_state();

        let first = place(32, 32, 0).execute(&mut state, &env).unwrap();
        assert!(first.is_ok());
        assert_eq!(state.peep_spawns.as_slice(), &[CoordsXYZD::new(33, 48, 0, 0)]);

        let second = place(32, 32, 2).execute(&mut state, &env).unwrap();
        assert!(second.is_ok());
        assert!(state.peep_spawns.is_empty());
        assert_eq!(
            invalidator.take(),
            vec![CoordsXY::new(32, 32), CoordsXY::new(32, 32)]
        );
    }

    #[test]
    fn full_collection_evicts_oldest_first() {
        let map = map_with_paths(&[(1, 1), (2, 1), (3, 1)]);
        let registry = AcceptAllRegistry;
        let invalidator = RecordingInvalidator::new();
        let env = GameEnv::with_all(&map, &registry, &invalidator);
        let mut state = editor_state();

        for x in [32, 64, 96] {
            let result = place(x, 32, 1).execute(&mut state, &env).unwrap();
            assert!(result.is_ok());
        }

        assert_eq!(state.peep_spawns.len(), GameConfig::MAX_PEEP_SPAWNS);
        assert_eq!(
            state.peep_spawns.as_slice(),
            &[CoordsXYZD::new(80, 63, 0, 1), CoordsXYZD::new(112, 63, 0, 1)]
        );
    }

    #[test]
    fn outside_editor_without_sandbox_is_rejected_first() {
        let map = TileMap::new(64);
        let registry = AcceptAllRegistry;
        let invalidator = RecordingInvalidator::new();
        let env = GameEnv::with_all(&map, &registry, &invalidator);
        let state = GameState::default();

        // Off-map and without a path; the mode check still wins.
        let result = place(-500, 10, 9).query(&state, &env).unwrap();

        assert_eq!(result.status(), Status::NotInEditorMode);
        assert_eq!(result.error_title(), Some(StringId::CANT_PLACE_PEEP_SPAWN_HERE));
    }

    #[test]
    fn sandbox_lifts_editor_requirement() {
        let map = map_with_paths(&[(1, 1)]);
        let registry = AcceptAllRegistry;
        let invalidator = RecordingInvalidator::new();
        let env = GameEnv::with_all(&map, &registry, &invalidator);
        let mut state = GameState::default();
        state.session.sandbox = true;

        let result = place(32, 32, 0).query(&state, &env).unwrap();

        assert!(result.is_ok());
        assert_eq!(result.expenditure, Some(ExpenditureType::LandPurchase));
    }

    #[test]
    fn off_map_coordinate_reports_edge_detail() {
        let map = map_with_paths(&[(0, 0)]);
        let registry = AcceptAllRegistry;
        let invalidator = RecordingInvalidator::new();
        let env = GameEnv::with_all(&map, &registry, &invalidator);
        let state = editor_state();

        for (x, y) in [(16, 32), (32, 16), (63 * 32 - 16, 32), (32, 5000)] {
            let result = place(x, y, 0).query(&state, &env).unwrap();
            assert_eq!(result.status(), Status::InvalidParameters);
            assert_eq!(result.error_message(), Some(StringId::OFF_EDGE_OF_MAP));
        }
    }

    #[test]
    fn query_rejections_map_to_reasons() {
        let map = TileMap::new(64)
            .with_path(TileCoordsXYZ::new(2, 2, 0))
            .with_ownership(2, 2, Ownership::Owned)
            .with_path(TileCoordsXYZ::new(3, 3, 0))
            .without_surface(3, 3);
        let registry = AcceptAllRegistry;
        let invalidator = RecordingInvalidator::new();
        let env = GameEnv::with_all(&map, &registry, &invalidator);
        let state = editor_state();

        let no_path = place(32, 32, 0).query(&state, &env).unwrap();
        assert_eq!(
            no_path.error_message(),
            Some(StringId::CAN_ONLY_BE_BUILT_ACROSS_PATHS)
        );

        let owned = place(64, 64, 0).query(&state, &env).unwrap();
        assert_eq!(
            owned.error_message(),
            Some(StringId::MUST_BE_OUTSIDE_PARK_BOUNDARIES)
        );

        let missing_surface = place(96, 96, 0).query(&state, &env).unwrap();
        assert_eq!(missing_surface.status(), Status::Unknown);

        let bad_direction = place(64, 64, 7).query(&state, &env).unwrap();
        assert_eq!(bad_direction.error_message(), Some(StringId::INVALID_DIRECTION));
    }

    #[test]
    fn exhausted_element_storage_is_reported() {
        let map = map_with_paths(&[(1, 1)]).with_element_usage(100, 100, 100);
        let registry = AcceptAllRegistry;
        let invalidator = RecordingInvalidator::new();
        let env = GameEnv::with_all(&map, &registry, &invalidator);

        let result = place(32, 32, 0).query(&editor_state(), &env).unwrap();

        assert_eq!(result.status(), Status::NoFreeElements);
    }

    #[test]
    fn rejected_execute_leaves_state_untouched() {
        let map = TileMap::new(64);
        let registry = AcceptAllRegistry;
        let invalidator = RecordingInvalidator::new();
        let env = GameEnv::with_all(&map, &registry, &invalidator);
        let mut state = editor_state();
        let before = state.clone();

        let result = place(32, 32, 0).execute(&mut state, &env).unwrap();

        assert!(!result.is_ok());
        assert_eq!(state, before);
        assert!(invalidator.take().is_empty());
    }

    #[test]
    fn missing_map_is_fatal() {
        let env = GameEnv::empty();
        let error = place(32, 32, 0).query(&editor_state(), &env).unwrap_err();
        assert_eq!(error, ActionError::Oracle(crate::env::OracleError::MapNotAvailable));
    }
}
