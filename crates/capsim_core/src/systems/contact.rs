use crate::bacterium::Bacterium;
use crate::behavior::{ContactEffect, ContactRule};
use crate::config::AppConfig;
use crate::metrics::{self, Metrics};
use crate::mover::{interaction_reach, is_colliding};
use crate::rng::{sample_normal, stream};
use crate::spatial_hash::SpatialHash;
use capsim_data::BacteriumId;
use rand_chacha::ChaCha8Rng;

pub struct ContactContext<'a> {
    pub config: &'a AppConfig,
    /// Grid built from the current midpoints.
    pub grid: &'a SpatialHash,
    pub rng: &'a mut ChaCha8Rng,
    pub metrics: &'a Metrics,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactRecord {
    pub victim: BacteriumId,
    pub attacker: BacteriumId,
    pub effect: ContactEffect,
}

/// First matching rule between a victim and each of its neighbors, in grid order.
fn find_attacker(
    i: usize,
    bacteria: &[Bacterium],
    rules: &[&ContactRule],
    ctx: &ContactContext,
    reach: f64,
    scratch: &mut Vec<usize>,
) -> Option<(usize, ContactEffect)> {
    let victim = &bacteria[i];
    let mech = &ctx.config.mechanics;
    scratch.clear();
    ctx.grid.query_into(victim.position(), reach, scratch);
    scratch.iter().copied().filter(|&j| j != i).find_map(|j| {
        let other = &bacteria[j];
        rules
            .iter()
            .find(|rule| {
                rule.attacker == other.species
                    && is_colliding(
                        victim,
                        other,
                        rule.range,
                        mech.overlap_measure,
                        mech.overlap_threshold,
                    )
            })
            .map(|rule| (j, rule.effect))
    })
}

/// Applies contact rules between species.
///
/// A victim is affected by its first contact only; later contacts with the
/// override already set are ignored. Effects are collected over the whole
/// population before any growth rate changes.
pub fn contact_system(bacteria: &mut [Bacterium], ctx: ContactContext) -> Vec<ContactRecord> {
    if ctx.config.contact_rules.is_empty() || bacteria.len() < 2 {
        return Vec::new();
    }
    let reach = interaction_reach(bacteria, ctx.config.interaction_margin());

    let mut hits = Vec::new();
    let mut scratch = Vec::new();
    for (i, b) in bacteria.iter().enumerate() {
        if b.growth_override.is_some() {
            continue;
        }
        let rules: Vec<&ContactRule> = ctx
            .config
            .contact_rules
            .iter()
            .filter(|r| r.victim == b.species)
            .collect();
        if rules.is_empty() {
            continue;
        }
        if let Some((j, effect)) = find_attacker(i, bacteria, &rules, &ctx, reach, &mut scratch) {
            hits.push((i, j, effect));
        }
    }

    let mut records = Vec::with_capacity(hits.len());
    for (i, j, effect) in hits {
        let attacker = bacteria[j].id();
        let b = &mut bacteria[i];
        let rate = match effect {
            ContactEffect::HaltGrowth => 0.0,
            ContactEffect::Shrink { mean, stdv } => {
                let mut own = b.rng.take();
                let rate = sample_normal(stream(&mut own, ctx.rng), mean, stdv);
                b.rng = own;
                rate
            }
        };
        b.growth_override = Some(rate);
        tracing::debug!(victim = %b.id(), attacker = %attacker, rate = rate, "Contact rule fired");
        records.push(ContactRecord {
            victim: b.id(),
            attacker,
            effect,
        });
    }

    if !records.is_empty() {
        ctx.metrics
            .add_to_counter(metrics::CONTACT_EVENTS, records.len() as u64);
    }
    records
}
