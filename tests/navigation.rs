mod common;

use common::{biased_genome, floor_world, walker};
use wayfarer_core::config::FieldConfig;
use wayfarer_core::pheromone::{DepositBuffer, PheromoneField, SignalCategory, WorldBounds};
use wayfarer_core::{AgentView, EnvironmentInputs, MoveCommand, Navigator};
use wayfarer_data::{CellCoord, Material, Voxel, VoxelLayer};

fn field(size: f64, resolution: usize) -> PheromoneField {
    PheromoneField::new(
        WorldBounds::from_size(size, size),
        resolution,
        FieldConfig::default(),
        5,
    )
}

#[test]
fn test_agent_walks_around_wall_to_goal() {
    let mut world = floor_world(10, 10, 4);
    // Wall across x = 5 with a gap at y >= 8, too tall to climb.
    for y in 0..8 {
        for z in 1..4 {
            world.set(
                CellCoord::new(5, y, z),
                Voxel::new(Material::Rock, VoxelLayer::Underground),
            );
        }
    }
    let species = walker();
    let genome = biased_genome([0.0; 8]);
    let f = field(10.0, 10);
    let navigator = Navigator::default();
    let env = EnvironmentInputs::default();
    let goal = CellCoord::new(8, 2, 1);

    let mut position = CellCoord::new(2, 2, 1);
    let mut steps = 0;
    while position != goal && steps < 60 {
        let view = AgentView {
            position,
            energy: 80.0,
            max_energy: 100.0,
            sensitivity: 0.5,
            species: &species,
            genome: &genome,
            goal: Some(goal),
        };
        let decision = navigator.decide(&world, &f, &view, &env).unwrap();
        assert!(decision.route_found);
        match decision.command {
            MoveCommand::Step { target, .. } => position = target,
            other => panic!("expected a step, got {other:?}"),
        }
        assert!(position.x != 5 || position.y >= 8, "walked into the wall");
        steps += 1;
    }
    assert_eq!(position, goal);
    assert!(steps >= 18, "took a shortcut: {steps} steps");
}

#[test]
fn test_emitted_deposits_reach_field() {
    let world = floor_world(10, 10, 4);
    let species = walker();
    let mut biases = [0.0; 8];
    biases[7] = 2.0;
    let genome = biased_genome(biases);
    let mut f = field(10.0, 10);
    let navigator = Navigator::default();
    let env = EnvironmentInputs::default();

    let positions = [CellCoord::new(2, 2, 1), CellCoord::new(7, 7, 1)];
    let views: Vec<AgentView<'_>> = positions
        .iter()
        .map(|&position| AgentView {
            position,
            energy: 80.0,
            max_energy: 100.0,
            sensitivity: 0.5,
            species: &species,
            genome: &genome,
            goal: None,
        })
        .collect();

    let mut buffer = DepositBuffer::new();
    for decision in navigator.decide_all(&world, &f, &views, &env) {
        buffer.extend(decision.unwrap().deposit);
    }
    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer.flush_into(&mut f), 2);
    assert!(buffer.is_empty());

    assert!(f.intensity_at(2.5, 2.5, SignalCategory::Territory) > 0.0);
    assert!(f.intensity_at(7.5, 7.5, SignalCategory::Territory) > 0.0);
    assert_eq!(f.recent_deposits().count(), 2);
}

#[test]
fn test_trail_pulls_agent_along_gradient() {
    let world = floor_world(10, 10, 4);
    let species = walker();
    // FollowTrail fully on, everything else neutral.
    let mut biases = [0.0; 8];
    biases[5] = 3.0;
    let genome = biased_genome(biases);
    let mut f = field(10.0, 10);
    f.add_signal(SignalCategory::Success, 4.5, 8.5, 1.0);

    let view = AgentView {
        position: CellCoord::new(4, 6, 1),
        energy: 80.0,
        max_energy: 100.0,
        sensitivity: 0.5,
        species: &species,
        genome: &genome,
        goal: None,
    };
    let decision = Navigator::default()
        .decide(&world, &f, &view, &EnvironmentInputs::default())
        .unwrap();
    assert_eq!(
        decision.command,
        MoveCommand::Step {
            direction: wayfarer_data::Direction::North,
            target: CellCoord::new(4, 7, 1),
        }
    );
}
