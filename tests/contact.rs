mod common;

use capsim_core::behavior::{ContactEffect, ContactRule};
use capsim_core::config::{AppConfig, SpeciesConfig};
use capsim_data::{BacteriumId, LiveEvent, RemovalCause, SpeciesId};
use common::{BacteriumBuilder, WorldBuilder};

fn with_rule(effect: ContactEffect) -> impl FnOnce(&mut AppConfig) {
    move |c: &mut AppConfig| {
        c.species.push(SpeciesConfig {
            name: "attacker".to_string(),
            ..Default::default()
        });
        c.contact_rules.push(ContactRule {
            victim: SpeciesId(0),
            attacker: SpeciesId(1),
            range: 0.0,
            effect,
        });
    }
}

#[test]
fn test_halted_victim_stops_growing() {
    let (mut world, mut env) = WorldBuilder::new()
        .with_config(with_rule(ContactEffect::HaltGrowth))
        .with_rod(BacteriumBuilder::horizontal(20.0, 20.0, 3.0).with_growth_rate(0.5))
        .with_rod(
            BacteriumBuilder::horizontal(20.0, 20.8, 3.0)
                .with_species(1)
                .with_growth_rate(0.5),
        )
        .build();
    let victim_length = world.bacteria[0].length;
    let attacker_length = world.bacteria[1].length;

    let events = world.update(&mut env).expect("tick");
    assert!(events.iter().any(|e| matches!(
        e,
        LiveEvent::Contact {
            victim: BacteriumId(1),
            attacker: BacteriumId(2),
            ..
        }
    )));

    for _ in 0..20 {
        world.update(&mut env).expect("tick");
    }

    let victim = world.get(BacteriumId(1)).expect("victim alive");
    assert_eq!(victim.length, victim_length);
    assert_eq!(victim.growth_override, Some(0.0));
    assert_eq!(victim.snapshot().k_growth, 0.0);
    let attacker = world.get(BacteriumId(2)).expect("attacker alive");
    assert!(attacker.length > attacker_length);
    assert!(attacker.growth_override.is_none());
}

#[test]
fn test_shrinking_victim_is_eventually_removed() {
    let (mut world, mut env) = WorldBuilder::new()
        .with_config(with_rule(ContactEffect::Shrink {
            mean: -0.5,
            stdv: 0.0,
        }))
        .with_rod(BacteriumBuilder::horizontal(20.0, 20.0, 3.0))
        .with_rod(
            BacteriumBuilder::horizontal(20.0, 20.8, 3.0)
                .with_species(1)
                .with_growth_rate(0.0),
        )
        .build();

    let mut removed_at = None;
    for _ in 0..400 {
        let events = world.update(&mut env).expect("tick");
        if events.iter().any(|e| matches!(
            e,
            LiveEvent::Removal {
                id: BacteriumId(1),
                cause: RemovalCause::NonViable,
                ..
            }
        )) {
            removed_at = Some(world.tick);
            break;
        }
    }

    assert!(removed_at.is_some(), "victim never shrank below viability");
    assert_bacterium_absent!(world, BacteriumId(1));
    assert!(world.get(BacteriumId(2)).is_some());
}

#[test]
fn test_contact_is_skipped_without_rules() {
    let (mut world, mut env) = WorldBuilder::new()
        .with_config(|c| {
            c.species.push(SpeciesConfig {
                name: "neighbor".to_string(),
                ..Default::default()
            });
        })
        .with_rod(BacteriumBuilder::horizontal(20.0, 20.0, 3.0))
        .with_rod(BacteriumBuilder::horizontal(20.0, 20.8, 3.0).with_species(1))
        .build();

    let events = world.update(&mut env).expect("tick");
    assert!(!events.iter().any(|e| matches!(e, LiveEvent::Contact { .. })));
    assert!(world.bacteria.iter().all(|b| b.growth_override.is_none()));
}
