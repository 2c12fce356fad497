//! Configuration management for the navigation core.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. Every engine parameter can be customized through
//! this configuration system.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impls)
//! 2. `config.toml` file (overrides defaults, section by section)
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 48
//! depth = 48
//! height = 16
//! seed = 7
//!
//! [field]
//! decay_rate = 0.02
//! diffusion_rate = 0.1
//!
//! [evolution]
//! mutation_rate = 0.1
//! ```

use serde::{Deserialize, Serialize};

/// Simulation-world parameters used by the headless runner.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u16,
    pub depth: u16,
    pub height: u16,
    /// Pheromone grid cells per side.
    pub field_resolution: usize,
    pub population: usize,
    pub seed: Option<u64>,
    /// Simulated seconds per tick.
    pub tick_seconds: f64,
    pub resource_energy: f64,
    pub move_energy_cost: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 48,
            depth: 48,
            height: 16,
            field_resolution: 48,
            population: 40,
            seed: None,
            tick_seconds: 0.05,
            resource_energy: 40.0,
            move_energy_cost: 0.2,
        }
    }
}

/// Pheromone diffusion, decay and deposit shaping.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FieldConfig {
    /// Fraction removed from every cell per field tick.
    pub decay_rate: f64,
    /// Fraction of a cell's intensity that diffuses per field tick, before noise.
    pub diffusion_rate: f64,
    /// Minimum simulated seconds between two field ticks.
    pub update_interval: f64,
    pub max_intensity: f64,
    /// Values below this snap to zero.
    pub cleanup_threshold: f64,
    /// Cells at or below this do not diffuse.
    pub diffusion_threshold: f64,
    /// Gradient components below this count as "no direction".
    pub gradient_floor: f64,
    pub spread_radius: usize,
    pub highway_radius: usize,
    pub highway_threshold: f64,
    pub highway_boost: f64,
    pub highway_boost_cap: f64,
    /// Relative deposit perturbation, applied as `1 ± amplitude`.
    pub noise_amplitude: f64,
    /// Seconds a deposit record stays in the log.
    pub log_max_age: f64,
    pub log_capacity: usize,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            decay_rate: 0.02,
            diffusion_rate: 0.1,
            update_interval: 0.1,
            max_intensity: 10.0,
            cleanup_threshold: 1e-3,
            diffusion_threshold: 0.01,
            gradient_floor: 0.01,
            spread_radius: 3,
            highway_radius: 2,
            highway_threshold: 0.6,
            highway_boost: 1.3,
            highway_boost_cap: 1.0,
            noise_amplitude: 0.2,
            log_max_age: 30.0,
            log_capacity: 4096,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PathfindingConfig {
    /// Heuristic weight on the vertical axis. Must not exceed the cheapest
    /// vertical step cost of the world for the heuristic to stay admissible.
    pub vertical_weight: f64,
    /// Accumulated cost beyond which nodes are pruned.
    pub max_distance: f64,
    pub layer_scan_radius: i32,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            vertical_weight: 1.2,
            max_distance: 128.0,
            layer_scan_radius: 4,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BrainConfig {
    pub max_hidden_layers: usize,
    pub min_neurons_per_layer: usize,
    pub max_neurons_per_layer: usize,
    /// Fresh weights are drawn from `[-weight_init, weight_init]`.
    pub weight_init: f32,
    /// Fresh biases are drawn from `[-bias_init, bias_init]`.
    pub bias_init: f32,
    pub weight_limit: f32,
    pub bias_limit: f32,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            max_hidden_layers: 4,
            min_neurons_per_layer: 2,
            max_neurons_per_layer: 16,
            weight_init: 2.0,
            bias_init: 1.0,
            weight_limit: 5.0,
            bias_limit: 3.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EvolutionConfig {
    pub mutation_rate: f32,
    pub mutation_strength: f32,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            mutation_rate: 0.1,
            mutation_strength: 0.3,
        }
    }
}

/// Metabolic pricing of a controller's structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EnergyConfig {
    pub per_neuron_cost: f64,
    pub per_connection_cost: f64,
    pub per_layer_cost: f64,
    pub prune_threshold: f64,
    pub grow_threshold: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            per_neuron_cost: 0.01,
            per_connection_cost: 0.001,
            per_layer_cost: 0.05,
            prune_threshold: 30.0,
            grow_threshold: 150.0,
        }
    }
}

/// Blending of the three movement drives.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct NavigationConfig {
    pub neural_weight: f64,
    pub trail_weight: f64,
    pub danger_weight: f64,
    pub path_weight: f64,
    /// Below this desired-vector length the agent holds still.
    pub hold_threshold: f64,
    /// `Emit` output level above which the agent deposits.
    pub emit_threshold: f32,
    pub deposit_strength: f64,
    /// Energy ratio under which deposits become distress calls.
    pub distress_energy_ratio: f64,
    /// Sensed danger level that turns deposits into alarms.
    pub danger_alarm: f64,
    /// Divisor that maps a cell's `z` into the input range.
    pub vertical_normalization: f64,
    /// World units per voxel edge, shared by the field and the voxel grid.
    pub voxel_size: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            neural_weight: 1.0,
            trail_weight: 0.8,
            danger_weight: 1.2,
            path_weight: 1.5,
            hold_threshold: 0.05,
            emit_threshold: 0.5,
            deposit_strength: 0.5,
            distress_energy_ratio: 0.2,
            danger_alarm: 0.3,
            vertical_normalization: 32.0,
            voxel_size: 1.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub field: FieldConfig,
    pub pathfinding: PathfindingConfig,
    pub brain: BrainConfig,
    pub evolution: EvolutionConfig,
    pub energy: EnergyConfig,
    pub navigation: NavigationConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // World validation
        anyhow::ensure!(self.world.width > 0, "World width must be positive");
        anyhow::ensure!(self.world.depth > 0, "World depth must be positive");
        anyhow::ensure!(
            self.world.height >= 3,
            "World height must leave room for ground and sky (min 3)"
        );
        anyhow::ensure!(
            self.world.field_resolution > 0 && self.world.field_resolution <= 1024,
            "Field resolution must be in [1, 1024]"
        );
        anyhow::ensure!(
            self.world.tick_seconds > 0.0,
            "Tick duration must be positive"
        );

        // Field validation
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.field.decay_rate),
            "Decay rate must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.field.diffusion_rate),
            "Diffusion rate must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            self.field.update_interval >= 0.0,
            "Field update interval must be non-negative"
        );
        anyhow::ensure!(
            self.field.max_intensity > 0.0,
            "Max intensity must be positive"
        );
        anyhow::ensure!(
            self.field.cleanup_threshold >= 0.0
                && self.field.cleanup_threshold < self.field.max_intensity,
            "Cleanup threshold must be in [0, max_intensity)"
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&self.field.noise_amplitude),
            "Noise amplitude must be in [0.0, 1.0)"
        );
        anyhow::ensure!(self.field.spread_radius > 0, "Spread radius must be positive");
        anyhow::ensure!(
            self.field.highway_radius > 0,
            "Highway radius must be positive"
        );
        anyhow::ensure!(
            self.field.highway_boost >= 1.0,
            "Highway boost must be at least 1.0"
        );
        anyhow::ensure!(self.field.log_capacity > 0, "Log capacity must be positive");

        // Pathfinding validation
        anyhow::ensure!(
            self.pathfinding.vertical_weight >= 0.0,
            "Vertical heuristic weight must be non-negative"
        );
        anyhow::ensure!(
            self.pathfinding.max_distance > 0.0,
            "Max path distance must be positive"
        );
        anyhow::ensure!(
            self.pathfinding.layer_scan_radius >= 0,
            "Layer scan radius must be non-negative"
        );

        // Brain validation
        anyhow::ensure!(
            self.brain.max_hidden_layers >= 1,
            "At least one hidden layer must be allowed"
        );
        anyhow::ensure!(
            self.brain.min_neurons_per_layer >= 1
                && self.brain.min_neurons_per_layer <= self.brain.max_neurons_per_layer,
            "Neurons per layer must satisfy 1 <= min <= max"
        );
        anyhow::ensure!(
            self.brain.weight_init > 0.0 && self.brain.weight_init <= self.brain.weight_limit,
            "Weight init range must be positive and within the weight limit"
        );
        anyhow::ensure!(
            self.brain.bias_init > 0.0 && self.brain.bias_init <= self.brain.bias_limit,
            "Bias init range must be positive and within the bias limit"
        );

        // Evolution validation
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.evolution.mutation_rate),
            "Mutation rate must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            self.evolution.mutation_strength >= 0.0,
            "Mutation strength must be non-negative"
        );

        // Energy validation
        anyhow::ensure!(
            self.energy.per_neuron_cost >= 0.0
                && self.energy.per_connection_cost >= 0.0
                && self.energy.per_layer_cost >= 0.0,
            "Metabolic unit costs must be non-negative"
        );
        anyhow::ensure!(
            self.energy.prune_threshold <= self.energy.grow_threshold,
            "Prune threshold must not exceed grow threshold"
        );

        // Navigation validation
        anyhow::ensure!(
            self.navigation.vertical_normalization > 0.0,
            "Vertical normalization must be positive"
        );
        anyhow::ensure!(
            self.navigation.voxel_size > 0.0,
            "Voxel size must be positive"
        );
        anyhow::ensure!(
            self.navigation.deposit_strength >= 0.0,
            "Deposit strength must be non-negative"
        );

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, falling back to defaults when the file is missing or invalid.
    pub fn load(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Config not readable, using defaults");
                Self::default()
            }
        }
    }

    /// Hash of every engine section, for telling runs apart.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.field).as_bytes());
        hasher.update(format!("{:?}", self.pathfinding).as_bytes());
        hasher.update(format!("{:?}", self.brain).as_bytes());
        hasher.update(format!("{:?}", self.evolution).as_bytes());
        hasher.update(format!("{:?}", self.energy).as_bytes());
        hasher.update(format!("{:?}", self.navigation).as_bytes());
        hex::encode(hasher.finalize())
    }
}
