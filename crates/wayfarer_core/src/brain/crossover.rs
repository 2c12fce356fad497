use rand::Rng;
use wayfarer_data::{ActivationKind, Genome};

/// Uniform crossover between genomes of possibly different shape.
///
/// The parent with fewer layers is the structural base (the first parent on a
/// tie). Every parameter list is mixed 50/50 over the overlapping prefix and
/// topped up from the base, so the child always has the base's layout.
pub fn genome_crossover_with_rng<R: Rng>(p1: &Genome, p2: &Genome, rng: &mut R) -> Genome {
    let (base, other) = if p1.layer_count() <= p2.layer_count() {
        (p1, p2)
    } else {
        (p2, p1)
    };

    let weights = blend(base.weights(), other.weights(), rng);
    let biases = blend(base.biases(), other.biases(), rng);
    let mut activations = blend(base.activations(), other.activations(), rng);

    let last = activations.len() - 1;
    activations[0] = ActivationKind::INPUT;
    activations[last] = ActivationKind::OUTPUT;

    Genome::new(base.topology().to_vec(), weights, biases, activations)
}

fn blend<T: Copy, R: Rng>(base: &[T], other: &[T], rng: &mut R) -> Vec<T> {
    base.iter()
        .enumerate()
        .map(|(i, &b)| match other.get(i) {
            Some(&o) if rng.gen_bool(0.5) => o,
            _ => b,
        })
        .collect()
}
