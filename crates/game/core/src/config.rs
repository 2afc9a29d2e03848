/// Game configuration constants.
///
/// Grouped on a type so call sites read `GameConfig::MAX_PEEP_SPAWNS` and
/// const generics can reference them directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameConfig;

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of peep spawn points stored by a park.
    pub const MAX_PEEP_SPAWNS: usize = 2;

    // ===== world geometry =====
    /// Width of one tile in world coordinate units.
    pub const COORDS_XY_STEP: i32 = 32;
    /// Height of one land step in world coordinate units.
    pub const COORDS_Z_STEP: i32 = 8;
    /// Distance from the map edge inside which nothing may be placed.
    pub const MAP_EDGE_MARGIN: i32 = 16;
    /// Upper bound on map size in tiles, independent of the loaded map.
    pub const MAXIMUM_MAP_SIZE: i32 = 1001;

    // ===== peep spawn placement =====
    /// Distance a spawn point is pushed from the tile centre towards its edge.
    pub const PEEP_SPAWN_INSET: i32 = 15;
    /// Free tile elements that must be reservable before a spawn is placed.
    pub const PEEP_SPAWN_FREE_ELEMENTS: u32 = 3;
}
