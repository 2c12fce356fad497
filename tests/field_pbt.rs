use proptest::prelude::*;
use wayfarer_core::config::FieldConfig;
use wayfarer_core::pheromone::{PheromoneDeposit, PheromoneField, SignalCategory, WorldBounds};

prop_compose! {
    fn arb_deposit()(
        x in -10.0f64..60.0,
        y in -10.0f64..60.0,
        category in 0usize..SignalCategory::COUNT,
        strength in 0.0f64..5.0
    ) -> PheromoneDeposit {
        PheromoneDeposit { x, y, category: SignalCategory::ALL[category], strength }
    }
}

fn field() -> PheromoneField {
    PheromoneField::new(WorldBounds::from_size(50.0, 50.0), 25, FieldConfig::default(), 11)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_cells_stay_within_cap(
        deposits in prop::collection::vec(arb_deposit(), 1..80),
        updates in 0usize..10
    ) {
        let mut f = field();
        f.apply_deposits(deposits);
        for t in 0..updates {
            f.update(t as f64);
        }
        let max = f.config().max_intensity;
        for x in 0..f.resolution() {
            for y in 0..f.resolution() {
                for c in SignalCategory::ALL {
                    let v = f.cell_value(x, y, c);
                    prop_assert!(v.is_finite() && (0.0..=max).contains(&v), "cell value {}", v);
                }
            }
        }
    }

    #[test]
    fn test_outside_deposit_changes_nothing(
        x in 50.5f64..200.0,
        y in -200.0f64..200.0,
        strength in 0.1f64..5.0
    ) {
        let mut f = field();
        prop_assert!(f.add_signal(SignalCategory::FoodFound, x, y, strength).is_none());
        prop_assert_eq!(f.total_intensity(SignalCategory::FoodFound), 0.0);
        prop_assert_eq!(f.intensity_at(x, y, SignalCategory::FoodFound), 0.0);
    }

    #[test]
    fn test_gradient_is_unit_or_absent(
        deposits in prop::collection::vec(arb_deposit(), 1..40),
        qx in 0.0f64..50.0,
        qy in 0.0f64..50.0
    ) {
        let mut f = field();
        f.apply_deposits(deposits);
        for c in SignalCategory::ALL {
            if let Some((gx, gy)) = f.gradient_at(qx, qy, c) {
                prop_assert!((gx.hypot(gy) - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_decay_never_increases_total(deposits in prop::collection::vec(arb_deposit(), 1..40)) {
        let config = FieldConfig { diffusion_rate: 0.0, ..FieldConfig::default() };
        let mut f = PheromoneField::new(WorldBounds::from_size(50.0, 50.0), 25, config, 3);
        f.apply_deposits(deposits);
        let mut previous: f64 = SignalCategory::ALL.iter().map(|&c| f.total_intensity(c)).sum();
        for t in 0..5 {
            f.update(t as f64);
            let total: f64 = SignalCategory::ALL.iter().map(|&c| f.total_intensity(c)).sum();
            prop_assert!(total <= previous + 1e-9);
            previous = total;
        }
    }
}
