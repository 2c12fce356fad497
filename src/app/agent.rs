use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wayfarer_core::brain::GenomeLogic;
use wayfarer_core::config::BrainConfig;
use wayfarer_core::voxel::{MaterialLogic, VoxelGrid, VoxelWorld};
use wayfarer_core::AgentView;
use wayfarer_data::{CellCoord, Direction, Genome, Locomotion, SpeciesProfile};

/// One navigating agent of the headless run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    pub species: usize,
    pub position: CellCoord,
    pub energy: f64,
    pub max_energy: f64,
    /// Weight on danger avoidance, `[0, 1]`.
    pub sensitivity: f64,
    /// Metabolic efficiency, `[0.5, 1.5]`.
    pub efficiency: f64,
    pub genome: Genome,
    pub goal: Option<CellCoord>,
    pub age: u64,
    pub generation: u32,
}

impl Agent {
    pub fn new_random<R: Rng>(
        species: usize,
        position: CellCoord,
        max_energy: f64,
        brain: &BrainConfig,
        rng: &mut R,
    ) -> Self {
        Self {
            id: Uuid::from_u128(rng.gen()),
            species,
            position,
            energy: max_energy * 0.8,
            max_energy,
            sensitivity: rng.gen_range(0.3..=1.0),
            efficiency: rng.gen_range(0.5..=1.5),
            genome: Genome::new_random_with_rng(brain, rng),
            goal: None,
            age: 0,
            generation: 0,
        }
    }

    /// Borrowed view handed to the navigator.
    pub fn view<'a>(&'a self, roster: &'a [SpeciesProfile]) -> AgentView<'a> {
        AgentView {
            position: self.position,
            energy: self.energy,
            max_energy: self.max_energy,
            sensitivity: self.sensitivity,
            species: &roster[self.species],
            genome: &self.genome,
            goal: self.goal,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0.0
    }
}

/// Species present in every run, one per locomotion style.
pub fn default_roster<R: Rng>(rng: &mut R) -> Vec<SpeciesProfile> {
    let mut id = || Uuid::from_u128(rng.gen());
    vec![
        SpeciesProfile::new(id(), "strider", Locomotion::WALKER),
        SpeciesProfile::new(
            id(),
            "gecko",
            Locomotion {
                walks: true,
                climbs: true,
                ..Default::default()
            },
        )
        .with_body_size(0.6),
        SpeciesProfile::new(
            id(),
            "newt",
            Locomotion {
                walks: true,
                swims: true,
                ..Default::default()
            },
        )
        .with_body_size(0.8),
        SpeciesProfile::new(
            id(),
            "mole",
            Locomotion {
                walks: true,
                burrows: true,
                ..Default::default()
            },
        ),
        SpeciesProfile::new(
            id(),
            "swift",
            Locomotion {
                walks: true,
                flies: true,
                ..Default::default()
            },
        )
        .with_body_size(0.5),
    ]
}

/// A surface cell standing on solid ground, if one turns up within a bounded
/// number of random picks.
pub fn random_standing_cell<R: Rng>(world: &VoxelGrid, rng: &mut R) -> Option<CellCoord> {
    const ATTEMPTS: usize = 64;
    let mut fallback = None;
    for _ in 0..ATTEMPTS {
        let x = rng.gen_range(0..world.width());
        let y = rng.gen_range(0..world.depth());
        let Some(z) = world.surface_height(x, y) else {
            continue;
        };
        let cell = CellCoord::new(x, y, z);
        let grounded = world
            .cell_at(cell.step(Direction::Down))
            .is_some_and(|v| v.material.is_solid());
        if grounded {
            return Some(cell);
        }
        fallback.get_or_insert(cell);
    }
    fallback
}

/// Nearest cell of `targets` by Manhattan distance; ties go to the first.
pub fn nearest(from: CellCoord, targets: &[CellCoord]) -> Option<CellCoord> {
    targets
        .iter()
        .copied()
        .min_by_key(|&c| from.manhattan(c))
}
