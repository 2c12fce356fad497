pub mod codec;
pub mod crossover;
pub mod forward;
pub mod mutation;
pub mod topology;

pub use codec::{decode_genome, encode_genome};
pub use topology::{create_genome_for_io_with_rng, create_genome_random_with_rng};
pub use wayfarer_data::{ActivationKind, Genome};

use crate::config::{AppConfig, BrainConfig};
use crate::error::{NavError, Result};
use rand::Rng;

/// Elementwise activation functions.
pub trait ActivationLogic {
    fn apply(&self, x: f32) -> f32;
    /// Output stays within `[-1, 1]` for any finite input.
    fn is_bounded(&self) -> bool;
}

impl ActivationLogic for ActivationKind {
    #[inline]
    fn apply(&self, x: f32) -> f32 {
        match self {
            ActivationKind::Identity => x,
            ActivationKind::Tanh => x.tanh(),
            ActivationKind::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActivationKind::Relu => x.max(0.0),
            ActivationKind::LeakyRelu => {
                if x > 0.0 {
                    x
                } else {
                    0.01 * x
                }
            }
            ActivationKind::Gaussian => (-x * x).exp(),
            ActivationKind::Sine => x.sin(),
        }
    }

    fn is_bounded(&self) -> bool {
        matches!(
            self,
            ActivationKind::Tanh
                | ActivationKind::Sigmoid
                | ActivationKind::Gaussian
                | ActivationKind::Sine
        )
    }
}

/// Trait defining the evolutionary and evaluation interface of a genome.
pub trait GenomeLogic: Sized {
    fn new_random(config: &BrainConfig) -> Self;
    fn new_random_with_rng<R: Rng>(config: &BrainConfig, rng: &mut R) -> Self;

    /// Forward pass. Fails with [`NavError::ShapeMismatch`] when `inputs`
    /// does not match the input layer width.
    fn predict(&self, inputs: &[f32]) -> Result<Vec<f32>>;

    fn crossover_with_rng<R: Rng>(&self, other: &Self, rng: &mut R) -> Self;
    fn crossover(&self, other: &Self) -> Self;

    #[must_use]
    fn mutated_with_rng<R: Rng>(
        &self,
        rate: f32,
        strength: f32,
        config: &BrainConfig,
        rng: &mut R,
    ) -> Self;

    #[must_use]
    fn mutated_with_config<R: Rng>(&self, config: &AppConfig, rng: &mut R) -> Self;

    fn distance(&self, other: &Self) -> f32;
    fn to_hex(&self) -> String;
    fn from_hex(hex_str: &str) -> Result<Self>;
}

pub const INPUT_LABELS: [&str; 31] = [
    "Energy",
    "PosX",
    "PosY",
    "Altitude",
    "Sensitivity",
    "DangerDX",
    "DangerDY",
    "FoodDX",
    "FoodDY",
    "TrailDX",
    "TrailDY",
    "DangerLevel",
    "DistressLevel",
    "RouteDX",
    "RouteDY",
    "RouteDZ",
    "RouteFound",
    "Season0",
    "Season1",
    "Season2",
    "Season3",
    "Weather0",
    "Weather1",
    "Weather2",
    "Disaster0",
    "Disaster1",
    "Ecosystem0",
    "Ecosystem1",
    "Ecosystem2",
    "Territory0",
    "Territory1",
];

pub const OUTPUT_LABELS: [&str; 8] = [
    "MoveX",
    "MoveY",
    "MoveZ",
    "Speed",
    "Aggro",
    "FollowTrail",
    "AvoidDanger",
    "Emit",
];

pub const BRAIN_INPUTS: usize = INPUT_LABELS.len();
pub const BRAIN_OUTPUTS: usize = OUTPUT_LABELS.len();

pub const AGENT_INPUT_OFFSET: usize = 0;
pub const AGENT_INPUT_WIDTH: usize = 5;
pub const FIELD_INPUT_OFFSET: usize = AGENT_INPUT_OFFSET + AGENT_INPUT_WIDTH;
pub const FIELD_INPUT_WIDTH: usize = 8;
pub const ROUTE_INPUT_OFFSET: usize = FIELD_INPUT_OFFSET + FIELD_INPUT_WIDTH;
pub const ROUTE_INPUT_WIDTH: usize = 4;
pub const SEASON_INPUT_OFFSET: usize = ROUTE_INPUT_OFFSET + ROUTE_INPUT_WIDTH;
pub const SEASON_INPUT_WIDTH: usize = 4;
pub const WEATHER_INPUT_OFFSET: usize = SEASON_INPUT_OFFSET + SEASON_INPUT_WIDTH;
pub const WEATHER_INPUT_WIDTH: usize = 3;
pub const DISASTER_INPUT_OFFSET: usize = WEATHER_INPUT_OFFSET + WEATHER_INPUT_WIDTH;
pub const DISASTER_INPUT_WIDTH: usize = 2;
pub const ECOSYSTEM_INPUT_OFFSET: usize = DISASTER_INPUT_OFFSET + DISASTER_INPUT_WIDTH;
pub const ECOSYSTEM_INPUT_WIDTH: usize = 3;
pub const TERRITORY_INPUT_OFFSET: usize = ECOSYSTEM_INPUT_OFFSET + ECOSYSTEM_INPUT_WIDTH;
pub const TERRITORY_INPUT_WIDTH: usize = 2;

const _: () = assert!(TERRITORY_INPUT_OFFSET + TERRITORY_INPUT_WIDTH == BRAIN_INPUTS);

impl GenomeLogic for Genome {
    fn new_random(config: &BrainConfig) -> Self {
        let mut rng = rand::thread_rng();
        Self::new_random_with_rng(config, &mut rng)
    }

    fn new_random_with_rng<R: Rng>(config: &BrainConfig, rng: &mut R) -> Self {
        topology::create_genome_random_with_rng(config, rng)
    }

    fn predict(&self, inputs: &[f32]) -> Result<Vec<f32>> {
        forward::predict(self, inputs)
    }

    fn crossover_with_rng<R: Rng>(&self, other: &Self, rng: &mut R) -> Self {
        crossover::genome_crossover_with_rng(self, other, rng)
    }

    fn crossover(&self, other: &Self) -> Self {
        let mut rng = rand::thread_rng();
        self.crossover_with_rng(other, &mut rng)
    }

    fn mutated_with_rng<R: Rng>(
        &self,
        rate: f32,
        strength: f32,
        config: &BrainConfig,
        rng: &mut R,
    ) -> Self {
        mutation::mutated_with_rng(self, rate, strength, config, rng)
    }

    fn mutated_with_config<R: Rng>(&self, config: &AppConfig, rng: &mut R) -> Self {
        mutation::mutated_with_rng(
            self,
            config.evolution.mutation_rate,
            config.evolution.mutation_strength,
            &config.brain,
            rng,
        )
    }

    fn distance(&self, other: &Self) -> f32 {
        if self.topology() != other.topology() {
            let layer_diff = self.layer_count().abs_diff(other.layer_count()) as f32;
            let width_diff: usize = self
                .topology()
                .iter()
                .zip(other.topology())
                .map(|(a, b)| a.abs_diff(*b))
                .sum();
            return 1.0 + layer_diff + width_diff as f32 * 0.1;
        }

        let weight_diff: f32 = self
            .weights()
            .iter()
            .zip(other.weights())
            .map(|(a, b)| (a - b).abs())
            .sum::<f32>()
            / self.weights().len().max(1) as f32;
        let bias_diff: f32 = self
            .biases()
            .iter()
            .zip(other.biases())
            .map(|(a, b)| (a - b).abs())
            .sum::<f32>()
            / self.biases().len().max(1) as f32;
        let activation_diff = self
            .activations()
            .iter()
            .zip(other.activations())
            .filter(|(a, b)| a != b)
            .count();
        weight_diff + bias_diff + activation_diff as f32 * 0.5
    }

    fn to_hex(&self) -> String {
        match serde_json::to_vec(self) {
            Ok(bytes) => hex::encode(bytes),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize genome to JSON");
                String::new()
            }
        }
    }

    fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| NavError::serialization(format!("Invalid hex encoding: {e}")))?;

        if bytes.is_empty() {
            return Err(NavError::serialization("Empty hex string"));
        }

        let genome: Genome = serde_json::from_slice(&bytes)?;
        genome.check_layout()?;
        Ok(genome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_genome_has_fixed_io() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let config = BrainConfig::default();
        for _ in 0..20 {
            let g = Genome::new_random_with_rng(&config, &mut rng);
            assert_eq!(g.input_width(), BRAIN_INPUTS);
            assert_eq!(g.output_width(), BRAIN_OUTPUTS);
            assert!((1..=config.max_hidden_layers).contains(&g.hidden_layer_count()));
            assert!(g
                .hidden_widths()
                .iter()
                .all(|w| (config.min_neurons_per_layer..=config.max_neurons_per_layer)
                    .contains(w)));
            assert_eq!(g.activations()[0], ActivationKind::Identity);
            assert_eq!(g.activations()[g.layer_count() - 1], ActivationKind::Tanh);
            assert!(g.check_layout().is_ok());
        }
    }

    #[test]
    fn test_predict_bounded_and_deterministic() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let g = Genome::new_random_with_rng(&BrainConfig::default(), &mut rng);
        let inputs = [0.5; BRAIN_INPUTS];
        let a = g.predict(&inputs).unwrap();
        let b = g.predict(&inputs).unwrap();
        assert_eq!(a.len(), BRAIN_OUTPUTS);
        assert_eq!(a, b, "Forward pass should be deterministic");
        for (i, v) in a.iter().enumerate() {
            assert!(v.is_finite(), "Output {} should be finite", i);
            assert!((-1.0..=1.0).contains(v), "Output {} out of range: {}", i, v);
        }
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let g = Genome::new_random_with_rng(&BrainConfig::default(), &mut rng);
        let err = g.predict(&[0.0; BRAIN_INPUTS - 1]).unwrap_err();
        assert!(matches!(
            err,
            NavError::ShapeMismatch {
                expected: BRAIN_INPUTS,
                actual
            } if actual == BRAIN_INPUTS - 1
        ));
        assert!(g.predict(&[0.0; BRAIN_INPUTS + 3]).is_err());
    }

    #[test]
    fn test_activation_functions() {
        assert_eq!(ActivationKind::Identity.apply(3.5), 3.5);
        assert_eq!(ActivationKind::Relu.apply(-2.0), 0.0);
        assert!((ActivationKind::LeakyRelu.apply(-1.0) + 0.01).abs() < 1e-7);
        assert!((ActivationKind::Sigmoid.apply(0.0) - 0.5).abs() < 1e-7);
        assert_eq!(ActivationKind::Gaussian.apply(0.0), 1.0);
        assert!(ActivationKind::OUTPUT.is_bounded());
        for kind in ActivationKind::HIDDEN.iter().filter(|k| k.is_bounded()) {
            for x in [-1e6, -3.0, 0.0, 3.0, 1e6] {
                let y = kind.apply(x);
                assert!((-1.0..=1.0).contains(&y), "{:?}({}) = {}", kind, x, y);
            }
        }
    }

    #[test]
    fn test_to_hex_roundtrip_is_exact() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let g = Genome::new_random_with_rng(&BrainConfig::default(), &mut rng);
        let hex = g.to_hex();
        let restored = Genome::from_hex(&hex).expect("Should deserialize successfully");
        assert_eq!(g, restored);
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert!(Genome::from_hex("").is_err());
        assert!(Genome::from_hex("zz").is_err());
        let bad = hex::encode(br#"{"topology":[2,2,1],"weights":[0.0],"biases":[0.0,0.0,0.0],"activations":["Identity","Tanh","Tanh"]}"#);
        assert!(matches!(
            Genome::from_hex(&bad),
            Err(NavError::InvalidGenome(_))
        ));
    }

    #[test]
    fn test_distance() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let config = BrainConfig::default();
        let a = Genome::new_random_with_rng(&config, &mut rng);
        assert_eq!(a.distance(&a), 0.0);
        let b = a.mutated_with_rng(1.0, 0.5, &config, &mut rng);
        assert!(a.distance(&b) > 0.0);
        assert!((a.distance(&b) - b.distance(&a)).abs() < 1e-6);
    }
}
