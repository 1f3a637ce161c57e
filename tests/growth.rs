mod common;

use common::BacteriumBuilder;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_growth_is_monotone_and_bounded(
        k in 0.05f64..2.0,
        start in 1.0f64..7.9,
        dt in 0.01f64..0.1,
    ) {
        let mut rod = BacteriumBuilder::horizontal(10.0, 10.0, start)
            .with_length(start)
            .with_growth_rate(k)
            .build();
        let mut previous = rod.length;
        for _ in 0..200 {
            rod.grow(dt);
            prop_assert!(rod.length <= rod.l_max);
            if rod.l_max - previous > 1e-6 {
                prop_assert!(rod.length > previous, "{} -> {}", previous, rod.length);
            } else {
                prop_assert!(rod.length >= previous);
            }
            prop_assert!(rod.elongation_rate >= 0.0);
            previous = rod.length;
        }
    }

    #[test]
    fn test_negative_rate_shrinks(k in -2.0f64..-0.05, start in 1.0f64..7.9) {
        let mut rod = BacteriumBuilder::horizontal(10.0, 10.0, start)
            .with_length(start)
            .with_growth_rate(k)
            .build();
        rod.grow(0.05);
        prop_assert!(rod.length < start);
    }
}

#[test]
fn test_growth_approaches_l_max_asymptotically() {
    let mut rod = BacteriumBuilder::horizontal(10.0, 10.0, 2.0)
        .with_growth_rate(0.5)
        .build();
    for _ in 0..2_000 {
        rod.grow(0.05);
    }
    assert!(rod.length <= rod.l_max);
    assert!(rod.l_max - rod.length < 1e-3);
}

#[test]
fn test_growth_override_replaces_sampled_rate() {
    let mut rod = BacteriumBuilder::horizontal(10.0, 10.0, 3.0)
        .with_growth_rate(0.5)
        .build();
    rod.growth_override = Some(0.0);
    rod.grow(0.05);
    assert_eq!(rod.length, 3.0);
    assert_eq!(rod.snapshot().k_growth, 0.0);
}
