//! # Wayfarer Core
//!
//! Navigation and cognition engines for agents living in a layered voxel world.
//!
//! This crate contains:
//! - A 2-D pheromone field with deposit, diffusion, decay and gradient queries
//! - A* pathfinding over voxel cells with species- and genome-aware costs
//! - Variable-topology neural controllers and their genetic operators
//! - An energy cost model that prunes or grows controllers
//! - The navigation decision that ties all of them together
//!
//! ## Example
//!
//! ```
//! use wayfarer_core::brain::{GenomeLogic, BRAIN_INPUTS, BRAIN_OUTPUTS};
//! use wayfarer_core::config::BrainConfig;
//! use wayfarer_data::Genome;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let genome = Genome::new_random_with_rng(&BrainConfig::default(), &mut rng);
//!
//! let outputs = genome.predict(&[0.5; BRAIN_INPUTS]).unwrap();
//! assert_eq!(outputs.len(), BRAIN_OUTPUTS);
//! ```

/// Neural controllers: forward pass, genetic operators and codecs
pub mod brain;
/// Configuration for every engine, loaded from TOML
pub mod config;
/// Metabolic cost of a controller's structure
pub mod energy;
/// Error types
pub mod error;
/// Run metrics and structured logging
pub mod metrics;
/// Sensing, steering and deposit requests for one agent
pub mod navigation;
/// Seeded value noise used by world generation and diffusion
pub mod noise;
/// A* search over voxel cells
pub mod pathfinding;
/// Chemical signal field
pub mod pheromone;
/// Voxel world capability and the dense grid implementation
pub mod voxel;

pub use brain::{ActivationLogic, GenomeLogic};
pub use energy::{Adaptation, EnergyCostModel};
pub use error::{NavError, Result};
pub use metrics::{init_logging, Metrics};
pub use navigation::{AgentView, EnvironmentInputs, MoveCommand, NavigationDecision, Navigator};
pub use pathfinding::{PathResult, VoxelPathfinder};
pub use pheromone::{PheromoneDeposit, PheromoneField, SignalLogic, WorldBounds};
pub use voxel::{MaterialLogic, VoxelGrid, VoxelWorld};
