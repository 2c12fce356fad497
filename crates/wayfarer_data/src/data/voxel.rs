use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

/// Integer address of a voxel. `z` is vertical.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellCoord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Neighbouring cell one step in `direction`. Saturates at the `i32` range.
    #[inline]
    #[must_use]
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy, dz) = direction.delta();
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.z.saturating_add(dz),
        )
    }

    /// Neighbouring cell one step in `direction`, or `None` past the `i32` range.
    #[inline]
    pub fn checked_step(self, direction: Direction) -> Option<Self> {
        let (dx, dy, dz) = direction.delta();
        self.checked_offset(dx, dy, dz)
    }

    pub fn checked_offset(self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(dx)?,
            self.y.checked_add(dy)?,
            self.z.checked_add(dz)?,
        ))
    }

    /// Cell containing a world-space point, for voxels of edge `voxel_size`.
    pub fn from_world(x: f64, y: f64, z: f64, voxel_size: f64) -> Option<Self> {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) || voxel_size <= 0.0 {
            return None;
        }
        Some(Self::new(
            (x / voxel_size).floor() as i32,
            (y / voxel_size).floor() as i32,
            (z / voxel_size).floor() as i32,
        ))
    }

    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }
}

/// One of the six face-adjacent moves.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit offset; North is +y, East is +x, Up is +z.
    #[inline]
    pub const fn delta(self) -> (i32, i32, i32) {
        match self {
            Direction::North => (0, 1, 0),
            Direction::South => (0, -1, 0),
            Direction::East => (1, 0, 0),
            Direction::West => (-1, 0, 0),
            Direction::Up => (0, 0, 1),
            Direction::Down => (0, 0, -1),
        }
    }

    #[inline]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Direction that moves from `from` to the face-adjacent `to`.
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        Self::ALL.into_iter().find(|d| from.step(*d) == to)
    }
}

/// Habitat band a voxel belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub enum VoxelLayer {
    /// Below the ground line.
    Underground,
    /// Open air directly above the ground.
    #[default]
    Surface,
    /// Under water.
    Aquatic,
    /// Inside tree crowns.
    Canopy,
    /// Open sky.
    Aerial,
}

/// What a voxel is made of.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub enum Material {
    #[default]
    Air,
    Soil,
    Sand,
    Rock,
    Bedrock,
    Water,
    Foliage,
}

impl Material {
    /// Whether a walker can stand on top of this material.
    pub const fn is_support(self) -> bool {
        matches!(
            self,
            Material::Soil | Material::Sand | Material::Rock | Material::Bedrock | Material::Foliage
        )
    }
}

/// A single addressable cell of the world grid.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct Voxel {
    pub material: Material,
    pub layer: VoxelLayer,
    /// Something edible or otherwise valuable sits here.
    pub resource: bool,
}

impl Voxel {
    pub const fn new(material: Material, layer: VoxelLayer) -> Self {
        Self {
            material,
            layer,
            resource: false,
        }
    }

    #[must_use]
    pub const fn with_resource(mut self) -> Self {
        self.resource = true;
        self
    }
}
