use super::ActivationLogic;
use crate::error::{NavError, Result};
use wayfarer_data::Genome;

/// Evaluates `genome` on `inputs`. Only per-call layer buffers are allocated.
pub fn predict(genome: &Genome, inputs: &[f32]) -> Result<Vec<f32>> {
    let topology = genome.topology();
    if inputs.len() != topology[0] {
        return Err(NavError::shape_mismatch(topology[0], inputs.len()));
    }

    let weights = genome.weights();
    let biases = genome.biases();
    let activations = genome.activations();

    let mut current: Vec<f32> = inputs.iter().map(|&x| activations[0].apply(x)).collect();
    let mut next = Vec::new();
    let mut w = 0;
    let mut b = 0;

    for (layer, &width) in topology.iter().enumerate().skip(1) {
        let fan_in = current.len();
        let activation = activations[layer];
        next.clear();
        next.reserve(width);
        for _ in 0..width {
            let row = &weights[w..w + fan_in];
            let sum: f32 = row.iter().zip(&current).map(|(wi, xi)| wi * xi).sum();
            next.push(activation.apply(sum + biases[b]));
            w += fan_in;
            b += 1;
        }
        std::mem::swap(&mut current, &mut next);
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_data::ActivationKind;

    #[test]
    fn test_hand_computed_forward_pass() {
        // 2 -> 2 -> 1, identity hidden so the arithmetic is visible
        let g = Genome::new(
            vec![2, 2, 1],
            vec![
                // hidden 0 <- (in0, in1)
                1.0, 2.0, //
                // hidden 1 <- (in0, in1)
                -1.0, 0.5, //
                // out <- (h0, h1)
                0.5, 1.0,
            ],
            vec![0.1, -0.2, 0.0],
            vec![
                ActivationKind::Identity,
                ActivationKind::Identity,
                ActivationKind::Tanh,
            ],
        );
        let out = predict(&g, &[1.0, 2.0]).unwrap();
        let h0 = 1.0 + 4.0 + 0.1;
        let h1 = -1.0 + 1.0 - 0.2;
        let expected = (0.5f32 * h0 + 1.0 * h1).tanh();
        assert_eq!(out.len(), 1);
        assert!((out[0] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_shape_mismatch_is_reported() {
        let g = Genome::new(
            vec![3, 2, 1],
            vec![0.0; 8],
            vec![0.0; 3],
            vec![ActivationKind::Identity; 3],
        );
        match predict(&g, &[0.0, 0.0]) {
            Err(NavError::ShapeMismatch { expected, actual }) => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }
}
