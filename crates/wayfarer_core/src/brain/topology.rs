use super::{BRAIN_INPUTS, BRAIN_OUTPUTS};
use crate::config::BrainConfig;
use rand::Rng;
use wayfarer_data::{ActivationKind, Genome};

/// Random genome with the standard sensory and motor widths.
pub fn create_genome_random_with_rng<R: Rng>(config: &BrainConfig, rng: &mut R) -> Genome {
    create_genome_for_io_with_rng(BRAIN_INPUTS, BRAIN_OUTPUTS, config, rng)
}

/// Random genome for arbitrary input and output widths.
pub fn create_genome_for_io_with_rng<R: Rng>(
    inputs: usize,
    outputs: usize,
    config: &BrainConfig,
    rng: &mut R,
) -> Genome {
    let topology = random_topology(inputs, outputs, config, rng);
    let activations = random_activations(topology.len(), rng);
    regenerate_parameters(topology, activations, config, rng)
}

/// First hidden layer drawn from the upper half of the width range, the last
/// from the lower half, the rest from anywhere in it.
pub fn random_topology<R: Rng>(
    inputs: usize,
    outputs: usize,
    config: &BrainConfig,
    rng: &mut R,
) -> Vec<usize> {
    let hidden = rng.gen_range(1..=config.max_hidden_layers.max(1));
    let min = config.min_neurons_per_layer.max(1);
    let max = config.max_neurons_per_layer.max(min);
    let mid = (min + max) / 2;

    let mut topology = Vec::with_capacity(hidden + 2);
    topology.push(inputs);
    for i in 0..hidden {
        let width = if i == 0 {
            rng.gen_range(mid..=max)
        } else if i == hidden - 1 {
            rng.gen_range(min..=mid)
        } else {
            rng.gen_range(min..=max)
        };
        topology.push(width);
    }
    topology.push(outputs);
    topology
}

pub fn random_hidden_width<R: Rng>(config: &BrainConfig, rng: &mut R) -> usize {
    let min = config.min_neurons_per_layer.max(1);
    let max = config.max_neurons_per_layer.max(min);
    rng.gen_range(min..=max)
}

pub fn random_hidden_activation<R: Rng>(rng: &mut R) -> ActivationKind {
    ActivationKind::HIDDEN[rng.gen_range(0..ActivationKind::HIDDEN.len())]
}

/// Identity input, tanh output, random hidden activations.
pub fn random_activations<R: Rng>(layers: usize, rng: &mut R) -> Vec<ActivationKind> {
    let mut activations = Vec::with_capacity(layers);
    activations.push(ActivationKind::INPUT);
    for _ in 1..layers.saturating_sub(1) {
        activations.push(random_hidden_activation(rng));
    }
    activations.push(ActivationKind::OUTPUT);
    activations
}

/// Fresh weights and biases for `topology`, keeping the given activations.
pub fn regenerate_parameters<R: Rng>(
    topology: Vec<usize>,
    activations: Vec<ActivationKind>,
    config: &BrainConfig,
    rng: &mut R,
) -> Genome {
    let w = config.weight_init;
    let b = config.bias_init;
    let weights = (0..Genome::weight_count_for(&topology))
        .map(|_| rng.gen_range(-w..=w))
        .collect();
    let biases = (0..Genome::bias_count_for(&topology))
        .map(|_| rng.gen_range(-b..=b))
        .collect();
    Genome::new(topology, weights, biases, activations)
}
