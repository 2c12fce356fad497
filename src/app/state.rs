use anyhow::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wayfarer_core::config::AppConfig;
use wayfarer_core::pheromone::{DepositBuffer, PheromoneField, WorldBounds};
use wayfarer_core::voxel::VoxelGrid;
use wayfarer_core::{EnergyCostModel, EnvironmentInputs, Metrics, Navigator, VoxelPathfinder};
use wayfarer_data::SpeciesProfile;

use super::agent::{default_roster, random_standing_cell, Agent};

/// Headless simulation composing the field, the world and the navigator.
pub struct App {
    pub config: AppConfig,
    pub seed: u64,
    pub tick: u64,
    /// Simulated seconds since start.
    pub time: f64,
    pub world: VoxelGrid,
    pub field: PheromoneField,
    pub navigator: Navigator,
    pub energy_model: EnergyCostModel,
    pub roster: Vec<SpeciesProfile>,
    pub agents: Vec<Agent>,
    pub env: EnvironmentInputs,
    pub metrics: Metrics,
    pub(crate) deposits: DepositBuffer,
    pub(crate) initial_resources: usize,
    pub(crate) rng: ChaCha8Rng,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.world.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let w = &config.world;
        let world = VoxelGrid::generate(w.width, w.depth, w.height, seed);
        let size = config.navigation.voxel_size;
        let bounds = WorldBounds::from_size(w.width as f64 * size, w.depth as f64 * size);
        let field = PheromoneField::new(bounds, w.field_resolution, config.field.clone(), seed);
        let navigator = Navigator::new(
            VoxelPathfinder::new(config.pathfinding.clone()),
            config.navigation.clone(),
        );
        let energy_model = EnergyCostModel::new(config.energy.clone(), config.brain.clone());
        let roster = default_roster(&mut rng);

        let mut agents = Vec::with_capacity(w.population);
        for i in 0..w.population {
            let Some(position) = random_standing_cell(&world, &mut rng) else {
                anyhow::bail!("Generated world has no surface to place agents on");
            };
            agents.push(Agent::new_random(
                i % roster.len(),
                position,
                AGENT_MAX_ENERGY,
                &config.brain,
                &mut rng,
            ));
        }

        let initial_resources = world.resource_cells().len();
        tracing::info!(
            seed,
            agents = agents.len(),
            resources = initial_resources,
            fingerprint = %config.fingerprint(),
            "Simulation initialised"
        );

        Ok(Self {
            config,
            seed,
            tick: 0,
            time: 0.0,
            world,
            field,
            navigator,
            energy_model,
            roster,
            agents,
            env: EnvironmentInputs::default(),
            metrics: Metrics::new(),
            deposits: DepositBuffer::new(),
            initial_resources,
            rng,
        })
    }

    pub fn population(&self) -> usize {
        self.agents.len()
    }

    pub fn mean_energy(&self) -> f64 {
        if self.agents.is_empty() {
            return 0.0;
        }
        self.agents.iter().map(|a| a.energy).sum::<f64>() / self.agents.len() as f64
    }
}

pub const AGENT_MAX_ENERGY: f64 = 100.0;
