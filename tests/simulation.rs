mod common;

use common::{biased_genome, small_config};
use wayfarer_core::metrics::counters;
use wayfarer_core::pheromone::SignalCategory;
use wayfarer_lib::App;

#[test]
fn test_same_seed_same_run() {
    let mut a = App::new(small_config(99)).unwrap();
    let mut b = App::new(small_config(99)).unwrap();
    let sa = a.run(60);
    let sb = b.run(60);
    assert_eq!(sa, sb);
    for (x, y) in a.agents.iter().zip(&b.agents) {
        assert_eq!(x.id, y.id);
        assert_eq!(x.position, y.position);
        assert_eq!(x.energy, y.energy);
        assert_eq!(x.genome, y.genome);
    }
    for c in SignalCategory::ALL {
        assert_eq!(a.field.total_intensity(c), b.field.total_intensity(c));
    }
}

#[test]
fn test_population_is_kept_by_replacement() {
    let config = small_config(3);
    let population = config.world.population;
    let mut app = App::new(config).unwrap();
    let summary = app.run(200);
    assert_eq!(summary.ticks, 200);
    assert_eq!(app.population(), population);
    assert_eq!(app.metrics.tick_count(), 200);
    assert_eq!(app.metrics.counter(counters::AGENT_REPLACED), summary.replaced as u64);
}

#[test]
fn test_exhausted_agent_gets_offspring() {
    let mut app = App::new(small_config(8)).unwrap();
    let old_id = app.agents[0].id;
    app.agents[0].energy = -1000.0;
    let summary = app.step();
    assert!(summary.replaced >= 1);
    let child = &app.agents[0];
    assert_ne!(child.id, old_id);
    assert!(child.is_alive());
    assert_eq!(child.generation, 1);
    assert!(child.genome.check_layout().is_ok());
}

#[test]
fn test_emitting_agent_marks_the_field() {
    let mut app = App::new(small_config(21)).unwrap();
    let mut biases = [0.0; 8];
    biases[7] = 2.0;
    app.agents[0].genome = biased_genome(biases);
    let mut deposits = 0;
    for _ in 0..5 {
        deposits += app.step().deposits;
    }
    assert!(deposits >= 5);
    assert_eq!(app.metrics.deposit_count(), deposits as u64);
    let total: f64 = SignalCategory::ALL
        .iter()
        .map(|&c| app.field.total_intensity(c))
        .sum();
    assert!(total > 0.0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = small_config(1);
    config.world.width = 0;
    assert!(App::new(config).is_err());
}
