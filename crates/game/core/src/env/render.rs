use std::sync::{Mutex, PoisonError};

use crate::state::CoordsXY;

/// Redraw hook for tiles whose visible contents changed.
pub trait TileInvalidator: Send + Sync {
    /// Marks the whole column of the tile containing `coords` for redraw.
    fn invalidate_tile_full(&self, coords: CoordsXY);
}

/// [`TileInvalidator`] that records tile starts in call order.
#[derive(Debug, Default)]
pub struct RecordingInvalidator {
    tiles: Mutex<Vec<CoordsXY>>,
}

impl RecordingInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and clears the recorded tiles.
    pub fn take(&self) -> Vec<CoordsXY> {
        let mut tiles = self.tiles.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *tiles)
    }
}

impl TileInvalidator for RecordingInvalidator {
    fn invalidate_tile_full(&self, coords: CoordsXY) {
        self.tiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(coords.to_tile_start());
    }
}
