use wayfarer_core::brain::{BRAIN_INPUTS, BRAIN_OUTPUTS};
use wayfarer_core::voxel::VoxelGrid;
use wayfarer_data::{
    ActivationKind, CellCoord, Genome, Locomotion, Material, SpeciesProfile, Voxel, VoxelLayer,
};
use wayfarer_lib::AppConfig;

/// Small, seeded configuration that keeps integration runs quick.
#[allow(dead_code)]
pub fn small_config(seed: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.world.width = 24;
    config.world.depth = 24;
    config.world.height = 12;
    config.world.field_resolution = 24;
    config.world.population = 12;
    config.world.seed = Some(seed);
    config
}

/// Bedrock floor at z = 0 with open air above.
#[allow(dead_code)]
pub fn floor_world(width: u16, depth: u16, height: u16) -> VoxelGrid {
    let mut grid = VoxelGrid::empty(width, depth, height);
    for x in 0..width as i32 {
        for y in 0..depth as i32 {
            grid.set(
                CellCoord::new(x, y, 0),
                Voxel::new(Material::Bedrock, VoxelLayer::Underground),
            );
        }
    }
    grid
}

#[allow(dead_code)]
pub fn walker() -> SpeciesProfile {
    SpeciesProfile::new(uuid::Uuid::nil(), "walker", Locomotion::WALKER)
}

/// Controller with zero weights, so its motor vector is `tanh(output_biases)`.
#[allow(dead_code)]
pub fn biased_genome(output_biases: [f32; BRAIN_OUTPUTS]) -> Genome {
    let topology = vec![BRAIN_INPUTS, 2, BRAIN_OUTPUTS];
    let mut biases = vec![0.0, 0.0];
    biases.extend_from_slice(&output_biases);
    Genome::new(
        topology.clone(),
        vec![0.0; Genome::weight_count_for(&topology)],
        biases,
        vec![
            ActivationKind::Identity,
            ActivationKind::Tanh,
            ActivationKind::Tanh,
        ],
    )
}
