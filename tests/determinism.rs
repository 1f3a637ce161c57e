mod common;

use capsim_data::BacteriumSnapshot;
use common::WorldBuilder;

fn run(seed: u64, ticks: u64) -> Vec<BacteriumSnapshot> {
    let (mut world, mut env) = WorldBuilder::new()
        .with_seed(seed)
        .with_config(|c| {
            c.world.initial_population = 6;
            c.world.deterministic = true;
        })
        .build();
    world.run(&mut env, ticks).expect("run");
    world.snapshot()
}

#[test]
fn test_same_seed_reproduces_the_colony() {
    let a = run(1234, 150);
    let b = run(1234, 150);
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn test_different_seeds_diverge() {
    let a = run(1, 10);
    let b = run(2, 10);
    assert_ne!(a, b);
}
