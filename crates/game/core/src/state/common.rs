use std::fmt;
use std::ops::Add;

use crate::config::GameConfig;

/// Identifier of a session participant.
///
/// Assigned by the host when a peer joins. The host itself is always
/// [`PlayerId::HOST`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u32);

impl PlayerId {
    /// The session authority (or the only player of a local session).
    pub const HOST: Self = Self(0);

    /// Placeholder for commands that have not been attributed yet.
    pub const NONE: Self = Self(u32::MAX);

    #[inline]
    pub const fn is_host(self) -> bool {
        self.0 == Self::HOST.0
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a permission group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupId(pub u8);

impl GroupId {
    pub const INVALID: Self = Self(u8::MAX);
}

impl Default for GroupId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group {}", self.0)
    }
}

/// Discrete logical simulation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unit offsets for the four cardinal directions, indexed by direction.
pub const DIRECTION_OFFSETS: [CoordsXY; 4] = [
    CoordsXY { x: -1, y: 0 },
    CoordsXY { x: 0, y: 1 },
    CoordsXY { x: 1, y: 0 },
    CoordsXY { x: 0, y: -1 },
];

/// Returns the unit offset for `direction`, or `None` when it is not one of
/// the four cardinal directions.
pub fn direction_offset(direction: u8) -> Option<CoordsXY> {
    DIRECTION_OFFSETS.get(usize::from(direction)).copied()
}

/// Planar world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordsXY {
    pub x: i32,
    pub y: i32,
}

impl CoordsXY {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Rounds down to the north-west corner of the containing tile.
    pub const fn to_tile_start(self) -> Self {
        Self {
            x: self.x & !(GameConfig::COORDS_XY_STEP - 1),
            y: self.y & !(GameConfig::COORDS_XY_STEP - 1),
        }
    }

    /// Centre of the containing tile.
    pub const fn to_tile_centre(self) -> Self {
        let start = self.to_tile_start();
        Self {
            x: start.x + GameConfig::COORDS_XY_STEP / 2,
            y: start.y + GameConfig::COORDS_XY_STEP / 2,
        }
    }

    pub const fn scaled(self, factor: i32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

impl Add for CoordsXY {
    type Output = CoordsXY;
    fn add(self, rhs: CoordsXY) -> CoordsXY {
        CoordsXY::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// World coordinates including height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordsXYZ {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CoordsXYZ {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn xy(self) -> CoordsXY {
        CoordsXY::new(self.x, self.y)
    }

    /// Tile-aligned version of this point; height is preserved.
    pub const fn to_tile_start(self) -> Self {
        let xy = self.xy().to_tile_start();
        Self::new(xy.x, xy.y, self.z)
    }
}

/// World coordinates with a facing direction (0..=3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordsXYZD {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub direction: u8,
}

impl CoordsXYZD {
    pub const fn new(x: i32, y: i32, z: i32, direction: u8) -> Self {
        Self { x, y, z, direction }
    }

    pub const fn xy(self) -> CoordsXY {
        CoordsXY::new(self.x, self.y)
    }

    pub const fn xyz(self) -> CoordsXYZ {
        CoordsXYZ::new(self.x, self.y, self.z)
    }
}

/// Tile-grid coordinates (x/y in tiles, z in land steps).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileCoordsXYZ {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl TileCoordsXYZ {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl From<CoordsXYZ> for TileCoordsXYZ {
    fn from(coords: CoordsXYZ) -> Self {
        Self {
            x: coords.x.div_euclid(GameConfig::COORDS_XY_STEP),
            y: coords.y.div_euclid(GameConfig::COORDS_XY_STEP),
            z: coords.z.div_euclid(GameConfig::COORDS_Z_STEP),
        }
    }
}

impl From<CoordsXYZD> for TileCoordsXYZ {
    fn from(coords: CoordsXYZD) -> Self {
        Self::from(coords.xyz())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_centre_of_interior_point() {
        let coords = CoordsXY::new(40, 70);
        assert_eq!(coords.to_tile_start(), CoordsXY::new(32, 64));
        assert_eq!(coords.to_tile_centre(), CoordsXY::new(48, 80));
    }

    #[test]
    fn tile_coords_divide_by_steps() {
        let tile = TileCoordsXYZ::from(CoordsXYZ::new(96, 33, 16));
        assert_eq!(tile, TileCoordsXYZ::new(3, 1, 2));
    }

    #[test]
    fn direction_offset_rejects_non_cardinal() {
        assert_eq!(direction_offset(2), Some(CoordsXY::new(1, 0)));
        assert_eq!(direction_offset(4), None);
    }
}
