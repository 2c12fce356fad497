use super::topology::{random_hidden_activation, random_hidden_width, regenerate_parameters};
use crate::config::BrainConfig;
use rand::Rng;
use wayfarer_data::Genome;

/// Share of `rate` that triggers a structural mutation instead of a point one.
pub const STRUCTURAL_FACTOR: f32 = 0.05;
const INSERT_LAYER_P: f32 = 0.3;
const REMOVE_LAYER_P: f32 = 0.2;
const REASSIGN_ACTIVATION_P: f64 = 0.2;

pub fn mutated_with_rng<R: Rng>(
    genome: &Genome,
    rate: f32,
    strength: f32,
    config: &BrainConfig,
    rng: &mut R,
) -> Genome {
    if rng.gen::<f32>() < rate * STRUCTURAL_FACTOR {
        return clamp_parameters(&structural_mutation(genome, config, rng), config);
    }
    point_mutation(genome, rate, strength, config, rng)
}

/// Perturb each weight and bias with probability `rate`, then clamp all of
/// them to the configured limits.
pub fn point_mutation<R: Rng>(
    genome: &Genome,
    rate: f32,
    strength: f32,
    config: &BrainConfig,
    rng: &mut R,
) -> Genome {
    let strength = strength.abs();
    let mut perturb = |v: f32, limit: f32| {
        let v = if rng.gen::<f32>() < rate {
            v + rng.gen_range(-strength..=strength)
        } else {
            v
        };
        v.clamp(-limit, limit)
    };

    let weights: Vec<f32> = genome
        .weights()
        .iter()
        .map(|&w| perturb(w, config.weight_limit))
        .collect();
    let biases: Vec<f32> = genome
        .biases()
        .iter()
        .map(|&b| perturb(b, config.bias_limit))
        .collect();

    Genome::new(
        genome.topology().to_vec(),
        weights,
        biases,
        genome.activations().to_vec(),
    )
}

/// Copy of `genome` with every weight and bias inside the configured limits.
pub fn clamp_parameters(genome: &Genome, config: &BrainConfig) -> Genome {
    let (wl, bl) = (config.weight_limit, config.bias_limit);
    Genome::new(
        genome.topology().to_vec(),
        genome.weights().iter().map(|w| w.clamp(-wl, wl)).collect(),
        genome.biases().iter().map(|b| b.clamp(-bl, bl)).collect(),
        genome.activations().to_vec(),
    )
}

/// Insert a layer (if below the maximum), else remove one (if more than one
/// hidden layer remains), else reassign hidden activations.
fn structural_mutation<R: Rng>(genome: &Genome, config: &BrainConfig, rng: &mut R) -> Genome {
    let roll = rng.gen::<f32>();
    let hidden = genome.hidden_layer_count();

    if roll < INSERT_LAYER_P && hidden < config.max_hidden_layers {
        let position = rng.gen_range(1..=hidden + 1);
        let width = random_hidden_width(config, rng);
        return insert_hidden_layer(genome, position, width, config, rng);
    }
    if roll < INSERT_LAYER_P + REMOVE_LAYER_P && hidden > 1 {
        let position = rng.gen_range(1..=hidden);
        return remove_hidden_layer(genome, position, config, rng);
    }
    reassign_activations(genome, rng)
}

/// New hidden layer at topology index `position` (`1..=hidden + 1`). All
/// weights and biases are regenerated.
pub fn insert_hidden_layer<R: Rng>(
    genome: &Genome,
    position: usize,
    width: usize,
    config: &BrainConfig,
    rng: &mut R,
) -> Genome {
    let position = position.clamp(1, genome.layer_count() - 1);
    let mut topology = genome.topology().to_vec();
    let mut activations = genome.activations().to_vec();
    topology.insert(position, width.max(1));
    activations.insert(position, random_hidden_activation(rng));
    tracing::debug!(position, width, layers = topology.len(), "Hidden layer inserted");
    regenerate_parameters(topology, activations, config, rng)
}

/// Drops the hidden layer at topology index `position`. All weights and
/// biases are regenerated. Returns an unchanged copy when only one hidden
/// layer is left.
pub fn remove_hidden_layer<R: Rng>(
    genome: &Genome,
    position: usize,
    config: &BrainConfig,
    rng: &mut R,
) -> Genome {
    if genome.hidden_layer_count() <= 1 {
        return genome.clone();
    }
    let position = position.clamp(1, genome.layer_count() - 2);
    let mut topology = genome.topology().to_vec();
    let mut activations = genome.activations().to_vec();
    topology.remove(position);
    activations.remove(position);
    tracing::debug!(position, layers = topology.len(), "Hidden layer removed");
    regenerate_parameters(topology, activations, config, rng)
}

/// Layout-preserving: weights and biases are kept.
fn reassign_activations<R: Rng>(genome: &Genome, rng: &mut R) -> Genome {
    let mut activations = genome.activations().to_vec();
    let last = activations.len() - 1;
    for activation in &mut activations[1..last] {
        if rng.gen_bool(REASSIGN_ACTIVATION_P) {
            *activation = random_hidden_activation(rng);
        }
    }
    Genome::new(
        genome.topology().to_vec(),
        genome.weights().to_vec(),
        genome.biases().to_vec(),
        activations,
    )
}
