use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::GameConfig;
use crate::state::{CoordsXY, TileCoordsXYZ};

/// Read access to the persistent tile map.
///
/// Only the narrow lookups actions need are exposed; the map storage itself
/// belongs to the embedding application.
pub trait MapOracle: Send + Sync {
    /// Edge length of the (square) map in tiles.
    fn size_tiles(&self) -> i32;

    /// Returns true if a footpath element exists at `tile`.
    fn has_path_at(&self, tile: TileCoordsXYZ) -> bool;

    /// Ownership of the surface element under `coords`, or `None` if the tile
    /// has no surface element (which indicates corrupt or unloaded storage).
    fn surface_ownership(&self, coords: CoordsXY) -> Option<Ownership>;

    /// Returns true if `count` tile elements can be allocated, compacting the
    /// element storage first if needed. Compaction must not change what any
    /// lookup observes.
    fn check_free_elements(&self, count: u32) -> bool;

    /// Largest usable world coordinate along either axis.
    fn size_units(&self) -> i32 {
        (self.size_tiles() - 1) * GameConfig::COORDS_XY_STEP
    }

    /// Returns true if `coords` lies inside the addressable tile grid.
    fn location_valid(&self, coords: CoordsXY) -> bool {
        let limit = GameConfig::MAXIMUM_MAP_SIZE * GameConfig::COORDS_XY_STEP;
        (0..limit).contains(&coords.x) && (0..limit).contains(&coords.y)
    }
}

/// Ownership state of a surface tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ownership {
    #[default]
    Unowned,
    Owned,
    ConstructionRightsOwned,
    AvailableForPurchase,
}

/// In-memory [`MapOracle`] over a square tile grid.
///
/// Every in-bounds tile has an unowned surface unless configured otherwise.
#[derive(Debug)]
pub struct TileMap {
    size_tiles: i32,
    paths: BTreeSet<TileCoordsXYZ>,
    ownership: BTreeMap<(i32, i32), Ownership>,
    missing_surfaces: BTreeSet<(i32, i32)>,
    element_capacity: u32,
    elements_live: u32,
    elements_allocated: AtomicU32,
}

impl TileMap {
    pub const DEFAULT_ELEMENT_CAPACITY: u32 = 0x30000;

    pub fn new(size_tiles: i32) -> Self {
        Self {
            size_tiles,
            paths: BTreeSet::new(),
            ownership: BTreeMap::new(),
            missing_surfaces: BTreeSet::new(),
            element_capacity: Self::DEFAULT_ELEMENT_CAPACITY,
            elements_live: 0,
            elements_allocated: AtomicU32::new(0),
        }
    }

    pub fn with_path(mut self, tile: TileCoordsXYZ) -> Self {
        self.paths.insert(tile);
        self
    }

    pub fn with_ownership(mut self, tile_x: i32, tile_y: i32, ownership: Ownership) -> Self {
        self.ownership.insert((tile_x, tile_y), ownership);
        self
    }

    pub fn without_surface(mut self, tile_x: i32, tile_y: i32) -> Self {
        self.missing_surfaces.insert((tile_x, tile_y));
        self
    }

    /// Configures element storage: `live` elements in use, `allocated` slots
    /// consumed including holes left by deletions, out of `capacity`.
    pub fn with_element_usage(mut self, live: u32, allocated: u32, capacity: u32) -> Self {
        self.elements_live = live;
        self.elements_allocated = AtomicU32::new(allocated.max(live));
        self.element_capacity = capacity;
        self
    }

    pub fn elements_allocated(&self) -> u32 {
        self.elements_allocated.load(Ordering::Acquire)
    }

    fn tile_of(coords: CoordsXY) -> (i32, i32) {
        (
            coords.x.div_euclid(GameConfig::COORDS_XY_STEP),
            coords.y.div_euclid(GameConfig::COORDS_XY_STEP),
        )
    }
}

impl MapOracle for TileMap {
    fn size_tiles(&self) -> i32 {
        self.size_tiles
    }

    fn has_path_at(&self, tile: TileCoordsXYZ) -> bool {
        self.paths.contains(&tile)
    }

    fn surface_ownership(&self, coords: CoordsXY) -> Option<Ownership> {
        let tile = Self::tile_of(coords);
        if tile.0 < 0 || tile.1 < 0 || tile.0 >= self.size_tiles || tile.1 >= self.size_tiles {
            return None;
        }
        if self.missing_surfaces.contains(&tile) {
            return None;
        }
        Some(self.ownership.get(&tile).copied().unwrap_or_default())
    }

    fn check_free_elements(&self, count: u32) -> bool {
        let allocated = self.elements_allocated.load(Ordering::Acquire);
        if self.element_capacity.saturating_sub(allocated) >= count {
            return true;
        }
        // Compact: reclaim holes so only live elements stay allocated.
        self.elements_allocated
            .store(self.elements_live, Ordering::Release);
        self.element_capacity.saturating_sub(self.elements_live) >= count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compaction_reclaims_fragmented_slots() {
        let map = TileMap::new(64).with_element_usage(90, 100, 100);

        assert!(map.check_free_elements(3));
        assert_eq!(map.elements_allocated(), 90);
        assert!(!map.check_free_elements(11));
    }

    #[test]
    fn surface_lookup_outside_grid_is_missing() {
        let map = TileMap::new(8);
        assert_eq!(map.surface_ownership(CoordsXY::new(40, 40)), Some(Ownership::Unowned));
        assert_eq!(map.surface_ownership(CoordsXY::new(8 * 32, 0)), None);
    }

    #[test]
    fn size_units_excludes_last_tile() {
        assert_eq!(TileMap::new(64).size_units(), 63 * 32);
    }
}
