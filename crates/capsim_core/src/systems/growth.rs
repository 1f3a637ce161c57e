use crate::bacterium::Bacterium;
use crate::config::{AppConfig, GrowthConfig};
use crate::error::SimError;
use crate::metrics::{self, Metrics};
use crate::rng::{sample_division_threshold, sample_growth_rate, stream};
use capsim_data::{BacteriumId, SpeciesId};
use rand_chacha::ChaCha8Rng;

pub struct GrowthContext<'a> {
    pub config: &'a AppConfig,
    pub rng: &'a mut ChaCha8Rng,
    /// Next unused bacterium id; advanced once per newborn.
    pub next_id: &'a mut u64,
    pub world_seed: u64,
    pub metrics: &'a Metrics,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivisionRecord {
    pub mother: BacteriumId,
    pub child: BacteriumId,
    pub species: SpeciesId,
    pub mother_length: f64,
    pub child_length: f64,
    /// Angle between the two axes right after the split, in `[0, pi/2]`.
    pub angle: f64,
}

/// Divisions completed in one growth pass.
#[derive(Debug, Default)]
pub struct GrowthOutcome {
    pub divisions: Vec<DivisionRecord>,
    /// First division that could not be carried out. Its mother is left
    /// untouched and the rest of the pass still runs.
    pub failure: Option<SimError>,
}

/// Draws a fresh growth rate and division threshold for `b`.
pub fn resample_parameters(
    b: &mut Bacterium,
    growth: &GrowthConfig,
    floor: f64,
    shared: &mut ChaCha8Rng,
) {
    let mut own = b.rng.take();
    {
        let rng = stream(&mut own, shared);
        b.k_growth = sample_growth_rate(rng, growth);
        b.division_threshold = sample_division_threshold(rng, growth, floor);
    }
    b.rng = own;
}

fn axis_angle(mother: &Bacterium, child: &Bacterium) -> f64 {
    mother
        .direction()
        .dot(child.direction())
        .abs()
        .clamp(0.0, 1.0)
        .acos()
}

/// Grows every bacterium and splits those past their threshold.
///
/// Daughters are held in a newborn buffer and appended only after the pass,
/// so a daughter neither grows nor divides in the tick it is born. Each
/// daughter draws its own growth rate and division threshold. Every
/// successful split is appended even when another mother fails.
pub fn growth_system(bacteria: &mut Vec<Bacterium>, ctx: GrowthContext) -> GrowthOutcome {
    let growth = &ctx.config.growth;
    let dt = ctx.config.world.dt;
    let floor = ctx.config.division_threshold_floor();

    let mut newborns = Vec::new();
    let mut records = Vec::new();
    let mut failure = None;
    for b in bacteria.iter_mut() {
        b.grow(dt);
        if !b.ready_to_divide() {
            continue;
        }

        let child_id = BacteriumId(*ctx.next_id);
        let mut own = b.rng.take();
        let divided = b.divide(child_id, growth, stream(&mut own, ctx.rng));
        b.rng = own;
        let mut child = match divided {
            Ok(child) => child,
            Err(err) => {
                tracing::error!(id = %b.id(), error = %err, "Division failed");
                failure.get_or_insert(err);
                continue;
            }
        };
        *ctx.next_id += 1;

        child.rng = ctx
            .config
            .seeding
            .strategy
            .agent_rng(ctx.world_seed, child_id);
        resample_parameters(&mut child, growth, floor, ctx.rng);
        if growth.resample_mother_on_division {
            resample_parameters(b, growth, floor, ctx.rng);
        }

        let record = DivisionRecord {
            mother: b.id(),
            child: child_id,
            species: b.species,
            mother_length: b.length,
            child_length: child.length,
            angle: axis_angle(b, &child),
        };
        tracing::debug!(
            mother = %record.mother,
            child = %record.child,
            mother_length = record.mother_length,
            child_length = record.child_length,
            "Division"
        );
        records.push(record);
        newborns.push(child);
    }

    if !newborns.is_empty() {
        ctx.metrics
            .add_to_counter(metrics::DIVISIONS, newborns.len() as u64);
        bacteria.append(&mut newborns);
    }
    GrowthOutcome {
        divisions: records,
        failure,
    }
}
