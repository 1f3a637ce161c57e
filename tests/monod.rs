mod common;

use capsim_core::behavior::{Behavior, MonodUptake, Secretion};
use capsim_core::config::SpeciesConfig;
use capsim_core::field::{ChemicalField, FieldConfig, FieldKind};
use common::{BacteriumBuilder, WorldBuilder};
use glam::DVec3;

fn monod_species(field: &str, density: f64) -> SpeciesConfig {
    SpeciesConfig {
        name: "consumer".to_string(),
        behavior: Behavior::Monod(MonodUptake {
            field: field.to_string(),
            mu_max: 1.3,
            k_s: 0.22,
            yield_coeff: 1.0,
            density,
        }),
        ..Default::default()
    }
}

fn concentration(env: &capsim_core::environment::Environment, field: &str, p: DVec3) -> f64 {
    env.fields
        .get(field)
        .map(|f| f.concentration_at(p))
        .expect("field registered")
}

#[test]
fn test_no_substrate_means_no_growth() {
    let (mut world, mut env) = WorldBuilder::new()
        .with_config(|c| {
            c.fields.push(FieldConfig {
                name: "glucose".into(),
                kind: FieldKind::Uniform { concentration: 0.0 },
            });
            c.species = vec![monod_species("glucose", 1.0)];
        })
        .with_rod(BacteriumBuilder::horizontal(20.0, 20.0, 3.0))
        .build();
    let before = world.bacteria[0].length;

    for _ in 0..50 {
        world.update(&mut env).expect("tick");
    }

    assert_eq!(world.bacteria[0].length, before);
    assert_eq!(world.bacteria[0].k_growth, 0.0);
}

#[test]
fn test_uptake_depletes_uniform_field() {
    let (mut world, mut env) = WorldBuilder::new()
        .with_config(|c| {
            c.fields.push(FieldConfig {
                name: "glucose".into(),
                kind: FieldKind::Uniform { concentration: 1.0 },
            });
            c.species = vec![monod_species("glucose", 1.0)];
        })
        .with_rod(BacteriumBuilder::horizontal(20.0, 20.0, 3.0))
        .build();
    let before = world.bacteria[0].length;

    world.update(&mut env).expect("tick");

    let rod = &world.bacteria[0];
    assert!((rod.k_growth - 1.3 / 1.22).abs() < 1e-12);
    assert!(rod.length > before);
    assert!(concentration(&env, "glucose", rod.position()) < 1.0);
}

#[test]
fn test_producer_raises_local_concentration() {
    let (mut world, mut env) = WorldBuilder::new()
        .without_growth()
        .with_config(|c| {
            c.fields.push(FieldConfig {
                name: "lysine".into(),
                kind: FieldKind::Grid {
                    boxes: [15, 10, 1],
                    diffusivity: 0.1,
                    decay: 0.0,
                    initial_concentration: 0.0,
                },
            });
            c.species = vec![SpeciesConfig {
                name: "producer".to_string(),
                behavior: Behavior::Producer(Secretion {
                    field: "lysine".into(),
                    rate: 10.0,
                }),
                ..Default::default()
            }];
        })
        .with_rod(BacteriumBuilder::horizontal(36.0, 25.0, 3.0))
        .build();

    for _ in 0..20 {
        world.update(&mut env).expect("tick");
    }

    let here = concentration(&env, "lysine", world.bacteria[0].position());
    let far = concentration(&env, "lysine", DVec3::new(2.0, 2.0, 0.5));
    assert!(here > 0.0);
    assert!(here > far);
    assert!(far >= 0.0);
}

#[test]
fn test_behavior_referencing_unknown_field_is_rejected() {
    let mut config = capsim_core::config::AppConfig::default();
    config.species = vec![monod_species("missing", 1.0)];
    assert!(capsim_lib::model::world::World::new(config).is_err());
}
