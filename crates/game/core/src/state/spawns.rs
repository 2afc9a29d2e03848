use arrayvec::ArrayVec;

use crate::config::GameConfig;

use super::{CoordsXYZ, CoordsXYZD};

/// An oriented point where new guests enter the park.
pub type PeepSpawn = CoordsXYZD;

type SpawnSlots = ArrayVec<PeepSpawn, { GameConfig::MAX_PEEP_SPAWNS }>;

/// Bounded, insertion-ordered collection of peep spawns.
///
/// The front entry is always the oldest. Inserting into a full collection
/// evicts from the front.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeepSpawns {
    slots: SpawnSlots,
}

impl PeepSpawns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.is_full()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeepSpawn> {
        self.slots.iter()
    }

    pub fn as_slice(&self) -> &[PeepSpawn] {
        self.slots.as_slice()
    }

    /// Index of the spawn on the same tile as `coords`. Direction is ignored.
    pub fn position_on_tile(&self, coords: CoordsXYZ) -> Option<usize> {
        let tile = coords.to_tile_start();
        self.slots
            .iter()
            .position(|spawn| spawn.xyz().to_tile_start() == tile)
    }

    /// Removes and returns the spawn at `index`, keeping the order of the rest.
    pub fn remove(&mut self, index: usize) -> Option<PeepSpawn> {
        if index < self.slots.len() {
            Some(self.slots.remove(index))
        } else {
            None
        }
    }

    /// Appends `spawn`, evicting the oldest entry first if the collection is full.
    ///
    /// Returns the evicted spawn, if any.
    pub fn push_evicting_oldest(&mut self, spawn: PeepSpawn) -> Option<PeepSpawn> {
        let evicted = if self.slots.is_full() {
            self.remove(0)
        } else {
            None
        };
        self.slots.push(spawn);
        evicted
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(x: i32, y: i32, direction: u8) -> PeepSpawn {
        CoordsXYZD::new(x, y, 0, direction)
    }

    #[test]
    fn push_into_full_collection_evicts_front() {
        let mut spawns = PeepSpawns::new();
        for i in 0..GameConfig::MAX_PEEP_SPAWNS as i32 {
            assert!(spawns.push_evicting_oldest(spawn(i * 32, 64, 0)).is_none());
        }

        let evicted = spawns.push_evicting_oldest(spawn(500, 500, 1));

        assert_eq!(evicted, Some(spawn(0, 64, 0)));
        assert_eq!(spawns.len(), GameConfig::MAX_PEEP_SPAWNS);
        assert_eq!(spawns.as_slice().last(), Some(&spawn(500, 500, 1)));
    }

    #[test]
    fn tile_lookup_ignores_direction_and_sub_tile_offset() {
        let mut spawns = PeepSpawns::new();
        spawns.push_evicting_oldest(spawn(33, 48, 0));

        assert_eq!(spawns.position_on_tile(CoordsXYZ::new(63, 32, 0)), Some(0));
        assert_eq!(spawns.position_on_tile(CoordsXYZ::new(64, 32, 0)), None);
        assert_eq!(spawns.position_on_tile(CoordsXYZ::new(33, 48, 8)), None);
    }
}
