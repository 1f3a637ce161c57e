mod common;

use capsim_core::config::OverlapMeasure;
use capsim_core::geometry::closest_points;
use capsim_core::mover::is_colliding;
use common::BacteriumBuilder;
use glam::DVec3;
use proptest::prelude::*;

prop_compose! {
    fn arb_capsule()(
        x in 5.0f64..45.0,
        y in 5.0f64..45.0,
        angle in 0.0f64..std::f64::consts::TAU,
        length in 0.5f64..6.0,
        radius in 0.3f64..0.8,
    ) -> BacteriumBuilder {
        let x1 = DVec3::new(x, y, 0.5);
        let x2 = x1 + DVec3::new(angle.cos(), angle.sin(), 0.0) * length;
        BacteriumBuilder::new(x1, x2).with_radius(radius)
    }
}

fn arb_measure() -> impl Strategy<Value = OverlapMeasure> {
    prop_oneof![Just(OverlapMeasure::Perimeter), Just(OverlapMeasure::Area)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn test_collision_is_symmetric(
        a in arb_capsule(),
        b in arb_capsule(),
        range in 0.0f64..0.5,
        measure in arb_measure(),
    ) {
        let (a, b) = (a.build(), b.build());
        prop_assert_eq!(
            is_colliding(&a, &b, range, measure, 0.0),
            is_colliding(&b, &a, range, measure, 0.0)
        );
    }

    #[test]
    fn test_identical_capsules_collide(a in arb_capsule(), measure in arb_measure()) {
        let a = a.build();
        prop_assert!(is_colliding(&a, &a.clone(), 0.0, measure, 0.0));
    }

    #[test]
    fn test_separated_capsules_do_not_collide(
        a in arb_capsule(),
        b in arb_capsule(),
        measure in arb_measure(),
    ) {
        let a = a.build();
        let mut b = b.build();
        // Shift b clear of every point a's rectangle can reach.
        let clearance = a.segment_length() + b.segment_length() + 2.0 * (a.radius + b.radius) + 1.0;
        let shift = DVec3::new(a.position().x - b.position().x + clearance, 0.0, 0.0);
        b.x1 += shift;
        b.x2 += shift;
        prop_assert!(!is_colliding(&a, &b, 0.0, measure, 0.0));
    }

    #[test]
    fn test_segment_distance_is_symmetric(a in arb_capsule(), b in arb_capsule()) {
        let (a, b) = (a.build(), b.build());
        let ab = closest_points(a.x1, a.x2, b.x1, b.x2).distance();
        let ba = closest_points(b.x1, b.x2, a.x1, a.x2).distance();
        prop_assert!((ab - ba).abs() < 1e-9);
        prop_assert!(ab <= a.position().distance(b.position()) + 1e-9);
    }
}

#[test]
fn test_crossed_capsules_collide() {
    let a = BacteriumBuilder::horizontal(8.0, 10.0, 4.0).build();
    let b = BacteriumBuilder::new(DVec3::new(10.0, 8.0, 0.5), DVec3::new(10.0, 12.0, 0.5)).build();
    assert!(is_colliding(&a, &b, 0.0, OverlapMeasure::Perimeter, 0.0));
    assert!(is_colliding(&a, &b, 0.0, OverlapMeasure::Area, 0.0));
}

#[test]
fn test_range_reaches_across_a_gap() {
    let a = BacteriumBuilder::horizontal(8.0, 10.0, 4.0).build();
    let b = BacteriumBuilder::horizontal(8.0, 11.2, 4.0).build();
    assert!(!is_colliding(&a, &b, 0.0, OverlapMeasure::Perimeter, 0.0));
    assert!(is_colliding(&a, &b, 0.2, OverlapMeasure::Perimeter, 0.0));
}

#[test]
fn test_capsules_stacked_in_z_do_not_collide() {
    let low = BacteriumBuilder::new(DVec3::new(8.0, 10.0, 1.0), DVec3::new(12.0, 10.0, 1.0)).build();
    let high = BacteriumBuilder::new(DVec3::new(8.0, 10.0, 20.0), DVec3::new(12.0, 10.0, 20.0)).build();
    for measure in [OverlapMeasure::Perimeter, OverlapMeasure::Area] {
        assert!(!is_colliding(&low, &high, 0.0, measure, 0.0));
        assert!(!is_colliding(&high, &low, 0.5, measure, 0.0));
    }

    // Touching end spheres in z still count.
    let above = BacteriumBuilder::new(DVec3::new(8.0, 10.0, 1.9), DVec3::new(12.0, 10.0, 1.9)).build();
    assert!(is_colliding(&low, &above, 0.0, OverlapMeasure::Perimeter, 0.0));
}
