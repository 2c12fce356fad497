//! Metabolic pricing of a controller's structure.
//!
//! Bigger networks cost more energy to run. Under energy pressure a genome
//! sheds its smallest hidden layer; with a comfortable surplus it may grow a
//! new one.

use crate::brain::mutation::{insert_hidden_layer, remove_hidden_layer};
use crate::brain::topology::random_hidden_width;
use crate::config::{BrainConfig, EnergyConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};
use wayfarer_data::Genome;

/// Prune only when upkeep eats more than this share of the remaining energy.
pub const PRUNE_COST_RATIO: f64 = 0.15;
/// Grow only when upkeep is below this share of the current energy.
pub const GROW_COST_RATIO: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Adaptation {
    Unchanged,
    Pruned,
    Grown,
}

#[derive(Debug, Clone, Default)]
pub struct EnergyCostModel {
    energy: EnergyConfig,
    brain: BrainConfig,
}

impl EnergyCostModel {
    pub fn new(energy: EnergyConfig, brain: BrainConfig) -> Self {
        Self { energy, brain }
    }

    /// Upkeep per tick. `efficiency` is inverted: 0.5 costs 1.5×, 1.5 costs 0.5×.
    pub fn cost(&self, genome: &Genome, efficiency: f64) -> f64 {
        let base = genome.neuron_count() as f64 * self.energy.per_neuron_cost
            + genome.connection_count() as f64 * self.energy.per_connection_cost
            + genome.layer_count() as f64 * self.energy.per_layer_cost;
        base * (2.0 - efficiency)
    }

    pub fn should_prune(&self, current_energy: f64, cost: f64) -> bool {
        current_energy < self.energy.prune_threshold && cost > current_energy * PRUNE_COST_RATIO
    }

    pub fn should_grow(&self, current_energy: f64, cost: f64) -> bool {
        current_energy > self.energy.grow_threshold && cost < current_energy * GROW_COST_RATIO
    }

    /// Removes the narrowest hidden layer (the first one on ties). Unchanged
    /// when a single hidden layer is left.
    pub fn prune<R: Rng>(&self, genome: &Genome, rng: &mut R) -> Genome {
        let Some((offset, _)) = genome
            .hidden_widths()
            .iter()
            .enumerate()
            .min_by_key(|&(i, &w)| (w, i))
        else {
            return genome.clone();
        };
        remove_hidden_layer(genome, offset + 1, &self.brain, rng)
    }

    /// Inserts a hidden layer of random width at a random hidden position.
    /// Unchanged at the layer limit.
    pub fn grow<R: Rng>(&self, genome: &Genome, rng: &mut R) -> Genome {
        let hidden = genome.hidden_layer_count();
        if hidden >= self.brain.max_hidden_layers {
            return genome.clone();
        }
        let position = rng.gen_range(1..=hidden + 1);
        let width = random_hidden_width(&self.brain, rng);
        insert_hidden_layer(genome, position, width, &self.brain, rng)
    }

    /// Prices `genome` and prunes or grows it when the energy level calls for it.
    pub fn adapt<R: Rng>(
        &self,
        genome: &Genome,
        current_energy: f64,
        efficiency: f64,
        rng: &mut R,
    ) -> (Genome, Adaptation) {
        let cost = self.cost(genome, efficiency);
        if self.should_prune(current_energy, cost) && genome.hidden_layer_count() > 1 {
            (self.prune(genome, rng), Adaptation::Pruned)
        } else if self.should_grow(current_energy, cost)
            && genome.hidden_layer_count() < self.brain.max_hidden_layers
        {
            (self.grow(genome, rng), Adaptation::Grown)
        } else {
            (genome.clone(), Adaptation::Unchanged)
        }
    }
}
