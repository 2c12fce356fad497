//! Voxel world access and per-species traversal cost.
//!
//! Pathfinding only sees the [`VoxelWorld`] trait. [`VoxelGrid`] is the dense
//! implementation used by the headless runner and the tests.

pub use wayfarer_data::{CellCoord, Direction, Genome, Material, SpeciesProfile, Voxel, VoxelLayer};

pub mod generation;

/// Multiplier applied to every vertical step. Keeps the cheapest vertical move
/// at or above the pathfinder's vertical heuristic weight.
pub const VERTICAL_STEP_FACTOR: f64 = 1.2;

/// Bodies larger than this cannot squeeze through foliage.
pub const FOLIAGE_BODY_LIMIT: f32 = 1.5;

/// Read-only cost provider consumed by the pathfinder.
pub trait VoxelWorld {
    fn cell_at(&self, coord: CellCoord) -> Option<&Voxel>;

    /// Cost of entering `into` by moving in `direction`. `f64::INFINITY`
    /// marks an illegal move.
    fn traversal_cost(
        &self,
        into: CellCoord,
        direction: Direction,
        species: &SpeciesProfile,
        genome: &Genome,
    ) -> f64;

    /// In-world neighbours of `coord`, regardless of legality.
    fn adjacent_cells(&self, coord: CellCoord) -> Vec<(Direction, CellCoord)> {
        Direction::ALL
            .into_iter()
            .filter_map(|d| coord.checked_step(d).map(|c| (d, c)))
            .filter(|(_, c)| self.cell_at(*c).is_some())
            .collect()
    }
}

pub trait MaterialLogic {
    /// Occupies the whole cell; only burrowers pass.
    fn is_solid(&self) -> bool;
    /// Cost for a burrower to dig through.
    fn burrow_cost(&self) -> f64;
    fn symbol(&self) -> char;
}

impl MaterialLogic for Material {
    fn is_solid(&self) -> bool {
        matches!(
            self,
            Material::Soil | Material::Sand | Material::Rock | Material::Bedrock
        )
    }

    fn burrow_cost(&self) -> f64 {
        match self {
            Material::Sand => 1.8,
            Material::Soil => 2.0,
            Material::Rock => 3.5,
            Material::Bedrock => f64::INFINITY,
            Material::Air | Material::Water | Material::Foliage => 1.0,
        }
    }

    fn symbol(&self) -> char {
        match self {
            Material::Air => ' ',
            Material::Soil => '▒',
            Material::Sand => '░',
            Material::Rock => '▓',
            Material::Bedrock => '█',
            Material::Water => '≈',
            Material::Foliage => '♠',
        }
    }
}

/// Deeper controllers handle climbing and digging slightly better.
pub fn agility_factor(genome: &Genome) -> f64 {
    let extra = genome.hidden_layer_count().saturating_sub(1) as f64;
    (1.0 - 0.05 * extra).max(0.8)
}

/// Dense `width × depth × height` voxel grid, `z` up.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    cells: Vec<Voxel>,
    width: i32,
    depth: i32,
    height: i32,
}

impl VoxelGrid {
    /// Grid with every cell set to `fill`.
    pub fn filled(width: u16, depth: u16, height: u16, fill: Voxel) -> Self {
        let len = width as usize * depth as usize * height as usize;
        Self {
            cells: vec![fill; len],
            width: width as i32,
            depth: depth as i32,
            height: height as i32,
        }
    }

    /// Open sky everywhere.
    pub fn empty(width: u16, depth: u16, height: u16) -> Self {
        Self::filled(
            width,
            depth,
            height,
            Voxel::new(Material::Air, VoxelLayer::Aerial),
        )
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline(always)]
    fn index(&self, c: CellCoord) -> usize {
        ((c.z * self.depth + c.y) * self.width + c.x) as usize
    }

    pub fn contains(&self, c: CellCoord) -> bool {
        (0..self.width).contains(&c.x)
            && (0..self.depth).contains(&c.y)
            && (0..self.height).contains(&c.z)
    }

    /// Writes one voxel; ignored outside the grid.
    pub fn set(&mut self, c: CellCoord, voxel: Voxel) {
        if self.contains(c) {
            let idx = self.index(c);
            self.cells[idx] = voxel;
        }
    }

    /// First non-solid, non-water cell above the highest solid column cell.
    pub fn surface_height(&self, x: i32, y: i32) -> Option<i32> {
        if !self.contains(CellCoord::new(x, y, 0)) {
            return None;
        }
        (0..self.height)
            .rev()
            .find(|&z| {
                let v = &self.cells[self.index(CellCoord::new(x, y, z))];
                v.material.is_support() || v.material == Material::Water
            })
            .map(|z| z + 1)
            .filter(|&z| z < self.height)
    }

    pub fn resource_cells(&self) -> Vec<CellCoord> {
        let mut out = Vec::new();
        for z in 0..self.height {
            for y in 0..self.depth {
                for x in 0..self.width {
                    let c = CellCoord::new(x, y, z);
                    if self.cells[self.index(c)].resource {
                        out.push(c);
                    }
                }
            }
        }
        out
    }

    /// Removes the resource at `c`, returning whether there was one.
    pub fn consume_resource(&mut self, c: CellCoord) -> bool {
        if !self.contains(c) {
            return false;
        }
        let idx = self.index(c);
        std::mem::replace(&mut self.cells[idx].resource, false)
    }

    fn material_at(&self, c: CellCoord) -> Option<Material> {
        self.cell_at(c).map(|v| v.material)
    }

    /// A walker can stand in `c`.
    fn supported(&self, c: CellCoord) -> bool {
        self.material_at(c.step(Direction::Down))
            .is_some_and(|m| m.is_support())
    }

    /// Something to hold on to, or step up onto, beside `c`.
    fn has_wall(&self, c: CellCoord) -> bool {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
        .into_iter()
        .any(|d| self.material_at(c.step(d)).is_some_and(|m| m.is_support()))
    }

    fn air_cost(&self, into: CellCoord, direction: Direction, species: &SpeciesProfile, agility: f64) -> f64 {
        let loco = species.locomotion;
        if loco.flies {
            return 1.0;
        }
        match direction {
            Direction::Up => {
                if !self.has_wall(into.step(Direction::Down)) {
                    f64::INFINITY
                } else if loco.climbs {
                    1.3 * agility
                } else if loco.walks && self.supported(into.step(Direction::Down)) {
                    2.0
                } else {
                    f64::INFINITY
                }
            }
            Direction::Down => {
                if (loco.walks || loco.climbs) && self.supported(into) {
                    1.0
                } else {
                    f64::INFINITY
                }
            }
            _ => {
                if !(loco.walks || loco.climbs) {
                    return f64::INFINITY;
                }
                let below = into.step(Direction::Down);
                if self.supported(into) {
                    1.0
                } else if loco.climbs && self.has_wall(into) {
                    1.5 * agility
                } else if self.material_at(below) == Some(Material::Air) && self.supported(below) {
                    // One-cell drop, resolved by the next downward step.
                    1.0
                } else {
                    f64::INFINITY
                }
            }
        }
    }
}

impl VoxelWorld for VoxelGrid {
    fn cell_at(&self, coord: CellCoord) -> Option<&Voxel> {
        if self.contains(coord) {
            Some(&self.cells[self.index(coord)])
        } else {
            None
        }
    }

    fn traversal_cost(
        &self,
        into: CellCoord,
        direction: Direction,
        species: &SpeciesProfile,
        genome: &Genome,
    ) -> f64 {
        let Some(voxel) = self.cell_at(into) else {
            return f64::INFINITY;
        };
        let loco = species.locomotion;
        let agility = agility_factor(genome);

        let base = match voxel.material {
            Material::Bedrock => f64::INFINITY,
            m if m.is_solid() => {
                if loco.burrows {
                    m.burrow_cost() * agility
                } else {
                    f64::INFINITY
                }
            }
            Material::Water => {
                if loco.swims {
                    1.0
                } else if loco.flies && !direction.is_vertical() {
                    1.5
                } else {
                    f64::INFINITY
                }
            }
            Material::Foliage => {
                if species.body_size > FOLIAGE_BODY_LIMIT {
                    f64::INFINITY
                } else if loco.climbs {
                    1.3 * agility
                } else if loco.flies {
                    1.2
                } else if loco.walks && !direction.is_vertical() {
                    2.0
                } else {
                    f64::INFINITY
                }
            }
            _ => self.air_cost(into, direction, species, agility),
        };

        if !base.is_finite() {
            return f64::INFINITY;
        }
        let cost = base.max(1.0);
        if direction.is_vertical() {
            cost * VERTICAL_STEP_FACTOR
        } else {
            cost
        }
    }
}
