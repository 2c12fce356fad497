use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-layer activation function.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub enum ActivationKind {
    /// Pass-through, used by the input layer.
    #[default]
    Identity,
    /// Bounded to [-1, 1], used by the output layer.
    Tanh,
    Sigmoid,
    Relu,
    LeakyRelu,
    Gaussian,
    Sine,
}

impl ActivationKind {
    /// Activations a hidden layer may draw from.
    pub const HIDDEN: [ActivationKind; 6] = [
        ActivationKind::Tanh,
        ActivationKind::Sigmoid,
        ActivationKind::Relu,
        ActivationKind::LeakyRelu,
        ActivationKind::Gaussian,
        ActivationKind::Sine,
    ];

    /// Activation every input layer uses.
    pub const INPUT: ActivationKind = ActivationKind::Identity;
    /// Activation every output layer uses.
    pub const OUTPUT: ActivationKind = ActivationKind::Tanh;
}

/// Layout inconsistencies between a genome's topology and its parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("topology needs an input, at least one hidden and an output layer (got {0} layers)")]
    TooFewLayers(usize),
    #[error("layer {index} has zero width")]
    EmptyLayer { index: usize },
    #[error("expected {expected} weights, found {actual}")]
    WeightCount { expected: usize, actual: usize },
    #[error("expected {expected} biases, found {actual}")]
    BiasCount { expected: usize, actual: usize },
    #[error("expected {expected} activations, found {actual}")]
    ActivationCount { expected: usize, actual: usize },
    #[error("non-finite parameter at index {0}")]
    NonFinite(usize),
}

/// Evolvable layered feed-forward network.
///
/// Weights are stored as row-major per-layer blocks: for the block between
/// layers `l` and `l + 1`, the weight from neuron `i` to neuron `j` sits at
/// `offset(l) + j * topology[l] + i`. Biases are stored for every layer after
/// the input, in order.
///
/// A `Genome` is immutable once built; evolutionary operators produce new
/// values.
#[derive(
    Clone, Debug, Serialize, Deserialize, PartialEq, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct Genome {
    topology: Vec<usize>,
    weights: Vec<f32>,
    biases: Vec<f32>,
    activations: Vec<ActivationKind>,
}

impl Genome {
    /// Builds a genome whose parameters must match `topology` exactly.
    ///
    /// # Panics
    /// Panics on any layout mismatch. Operators that produce genomes are
    /// expected to uphold the layout, so a mismatch is a bug.
    #[must_use]
    pub fn new(
        topology: Vec<usize>,
        weights: Vec<f32>,
        biases: Vec<f32>,
        activations: Vec<ActivationKind>,
    ) -> Self {
        match Self::try_new(topology, weights, biases, activations) {
            Ok(genome) => genome,
            Err(e) => panic!("invalid genome layout: {e}"),
        }
    }

    /// Builds a genome from untrusted parts, reporting layout errors.
    pub fn try_new(
        topology: Vec<usize>,
        weights: Vec<f32>,
        biases: Vec<f32>,
        activations: Vec<ActivationKind>,
    ) -> Result<Self, LayoutError> {
        let genome = Self {
            topology,
            weights,
            biases,
            activations,
        };
        genome.check_layout()?;
        Ok(genome)
    }

    /// Verifies that parameter counts agree with the topology.
    pub fn check_layout(&self) -> Result<(), LayoutError> {
        if self.topology.len() < 3 {
            return Err(LayoutError::TooFewLayers(self.topology.len()));
        }
        if let Some(index) = self.topology.iter().position(|&w| w == 0) {
            return Err(LayoutError::EmptyLayer { index });
        }
        let expected = Self::weight_count_for(&self.topology);
        if self.weights.len() != expected {
            return Err(LayoutError::WeightCount {
                expected,
                actual: self.weights.len(),
            });
        }
        let expected = Self::bias_count_for(&self.topology);
        if self.biases.len() != expected {
            return Err(LayoutError::BiasCount {
                expected,
                actual: self.biases.len(),
            });
        }
        if self.activations.len() != self.topology.len() {
            return Err(LayoutError::ActivationCount {
                expected: self.topology.len(),
                actual: self.activations.len(),
            });
        }
        if let Some(i) = self
            .weights
            .iter()
            .chain(self.biases.iter())
            .position(|v| !v.is_finite())
        {
            return Err(LayoutError::NonFinite(i));
        }
        Ok(())
    }

    /// Number of weights implied by a topology.
    #[must_use]
    pub fn weight_count_for(topology: &[usize]) -> usize {
        topology.windows(2).map(|w| w[0] * w[1]).sum()
    }

    /// Number of biases implied by a topology.
    #[must_use]
    pub fn bias_count_for(topology: &[usize]) -> usize {
        topology.iter().skip(1).sum()
    }

    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    pub fn activations(&self) -> &[ActivationKind] {
        &self.activations
    }

    pub fn input_width(&self) -> usize {
        self.topology[0]
    }

    pub fn output_width(&self) -> usize {
        self.topology[self.topology.len() - 1]
    }

    pub fn layer_count(&self) -> usize {
        self.topology.len()
    }

    pub fn hidden_layer_count(&self) -> usize {
        self.topology.len() - 2
    }

    /// Widths of the hidden layers only.
    pub fn hidden_widths(&self) -> &[usize] {
        &self.topology[1..self.topology.len() - 1]
    }

    /// Neurons that compute something (hidden and output layers).
    pub fn neuron_count(&self) -> usize {
        self.topology.iter().skip(1).sum()
    }

    pub fn connection_count(&self) -> usize {
        self.weights.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> Genome {
        // 2 -> 3 -> 1
        Genome::new(
            vec![2, 3, 1],
            vec![0.1; 9],
            vec![0.0; 4],
            vec![
                ActivationKind::Identity,
                ActivationKind::Relu,
                ActivationKind::Tanh,
            ],
        )
    }

    #[test]
    fn test_counts_follow_topology() {
        assert_eq!(Genome::weight_count_for(&[4, 5, 3, 2]), 20 + 15 + 6);
        assert_eq!(Genome::bias_count_for(&[4, 5, 3, 2]), 10);

        let g = tiny();
        assert_eq!(g.neuron_count(), 4);
        assert_eq!(g.connection_count(), 9);
        assert_eq!(g.hidden_layer_count(), 1);
        assert_eq!(g.hidden_widths(), &[3]);
    }

    #[test]
    fn test_try_new_rejects_short_weights() {
        let err = Genome::try_new(
            vec![2, 3, 1],
            vec![0.0; 8],
            vec![0.0; 4],
            vec![ActivationKind::Identity; 3],
        )
        .unwrap_err();
        assert_eq!(
            err,
            LayoutError::WeightCount {
                expected: 9,
                actual: 8
            }
        );
    }

    #[test]
    fn test_try_new_rejects_missing_hidden_layer() {
        let err = Genome::try_new(vec![2, 1], vec![0.0; 2], vec![0.0], vec![]).unwrap_err();
        assert_eq!(err, LayoutError::TooFewLayers(2));
    }

    #[test]
    fn test_try_new_rejects_nan() {
        let mut weights = vec![0.0; 9];
        weights[4] = f32::NAN;
        let err = Genome::try_new(
            vec![2, 3, 1],
            weights,
            vec![0.0; 4],
            vec![ActivationKind::Identity; 3],
        )
        .unwrap_err();
        assert_eq!(err, LayoutError::NonFinite(4));
    }

    #[test]
    #[should_panic(expected = "invalid genome layout")]
    fn test_new_panics_on_bias_mismatch() {
        let _ = Genome::new(
            vec![2, 3, 1],
            vec![0.0; 9],
            vec![0.0; 3],
            vec![ActivationKind::Identity; 3],
        );
    }

    #[test]
    fn test_json_roundtrip_is_exact() {
        let g = Genome::new(
            vec![2, 3, 1],
            vec![0.1, -0.7, 1.337, 2.0, -1.999, 0.333, 1e-7, -4.2, 0.5],
            vec![0.25, -0.125, 0.9, -0.01],
            vec![
                ActivationKind::Identity,
                ActivationKind::Sine,
                ActivationKind::Tanh,
            ],
        );
        let json = serde_json::to_string(&g).unwrap();
        let back: Genome = serde_json::from_str(&json).unwrap();
        assert_eq!(g, back);
    }
}
